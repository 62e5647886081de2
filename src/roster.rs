//! Player identities, skill tiers and the roster format served by the scheduling service.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Matches "Label (identity)" and captures the parenthesized identity
static IDENTITY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*\(([^)]+)\)$").expect("identity suffix pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// Player descriptor is neither a string nor an object carrying `player`/`name`.
    #[error("malformed player record: {0}")]
    MalformedPlayerRecord(String),
}

/// Skill tier used to balance teams. An A-player is always paired with a C-player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillTier {
    A,
    B,
    C,
}

impl SkillTier {
    pub const ALL: [SkillTier; 3] = [SkillTier::A, SkillTier::B, SkillTier::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillTier::A => "A",
            SkillTier::B => "B",
            SkillTier::C => "C",
        }
    }

    /// Parses "A"/"b"/" C " style input
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(SkillTier::A),
            "B" => Some(SkillTier::B),
            "C" => Some(SkillTier::C),
            _ => None,
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A roster entry. Serialized the way the roster store keeps it: `{ "player", "previousRank" }`.
///
/// `identity` holds the roster string as stored, label included, since the scheduler keys on it.
/// Comparisons between players go through [`identity_of`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "player")]
    pub identity: String,
    #[serde(rename = "previousRank")]
    pub tier: SkillTier,
}

impl Player {
    pub fn new(identity: impl Into<String>, tier: SkillTier) -> Self {
        Self {
            identity: identity.into(),
            tier,
        }
    }
}

/// Player descriptor as it shows up in schedule and score documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerRecord {
    /// Bare name or "Label (identity)"
    Label(String),
    /// Object form; `player` wins over `name`
    Record {
        player: Option<String>,
        name: Option<String>,
    },
}

impl PlayerRecord {
    /// Classifies a raw JSON descriptor. Anything that is not a string or object is malformed.
    pub fn from_value(value: &Value) -> Result<Self, RosterError> {
        match value {
            Value::String(s) => Ok(PlayerRecord::Label(s.clone())),
            Value::Object(map) => {
                let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
                Ok(PlayerRecord::Record {
                    player: field("player"),
                    name: field("name"),
                })
            }
            other => Err(RosterError::MalformedPlayerRecord(other.to_string())),
        }
    }

    /// The display label carried by the record.
    pub fn label(&self) -> Result<&str, RosterError> {
        match self {
            PlayerRecord::Label(s) => Ok(s.as_str()),
            PlayerRecord::Record { player: Some(p), .. } => Ok(p.as_str()),
            PlayerRecord::Record { name: Some(n), .. } => Ok(n.as_str()),
            PlayerRecord::Record { .. } => Err(RosterError::MalformedPlayerRecord(
                "object without `player` or `name`".to_string(),
            )),
        }
    }
}

/// Extracts the parenthesized suffix of a label, or returns the label unchanged.
pub fn identity_of(label: &str) -> &str {
    IDENTITY_SUFFIX
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(label)
}

/// Canonical identity of any player descriptor.
pub fn canonical_identity(raw: &PlayerRecord) -> Result<String, RosterError> {
    Ok(identity_of(raw.label()?).to_string())
}

/// A player descriptor normalized once at ingestion.
///
/// `label` is what the service stored (and expects back on writes),
/// `identity` is the key used by selections, withdrawals and standings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlayerRef {
    pub label: String,
    pub identity: String,
}

impl PlayerRef {
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        let identity = identity_of(&label).to_string();
        Self { label, identity }
    }

    pub fn from_record(record: &PlayerRecord) -> Result<Self, RosterError> {
        Ok(Self::from_label(record.label()?))
    }

    pub fn from_value(value: &Value) -> Result<Self, RosterError> {
        Self::from_record(&PlayerRecord::from_value(value)?)
    }
}

/// Normalizes a list of raw descriptors, skipping malformed ones.
pub fn normalize_players<'a, I>(values: I) -> Vec<PlayerRef>
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .filter_map(|value| match PlayerRef::from_value(value) {
            Ok(player) => Some(player),
            Err(e) => {
                log::warn!("skipping player descriptor: {}", e);
                None
            }
        })
        .collect()
}

/// Parses a roster document (array of `{ player, previousRank }`), skipping entries that don't fit.
pub fn parse_roster(value: &Value) -> Vec<Player> {
    let Some(entries) = value.as_array() else {
        log::warn!("roster document is not an array");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<Player>(entry.clone()) {
            Ok(player) => Some(player),
            Err(e) => {
                log::warn!("skipping roster entry {}: {}", entry, e);
                None
            }
        })
        .collect()
}
