use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::naming::{round_index, team_key, team_position};
use crate::roster::{normalize_players, PlayerRef};

/// A team slot within a round, members in slot order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub key: String,
    pub position: usize,
    pub members: Vec<PlayerRef>,
}

impl Team {
    /// Matches on the stored label or on the canonical identity
    pub fn has_member(&self, player: &PlayerRef) -> bool {
        self.members
            .iter()
            .any(|m| m.label == player.label || m.identity == player.identity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Round {
    pub key: String,
    pub index: u32,
    pub teams: Vec<Team>,
}

impl Round {
    pub fn team(&self, key: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.key == key)
    }

    pub fn label(&self) -> String {
        format!("Round {}", self.index)
    }
}

/// A player who is paired with the same partners more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub key: String,
    #[serde(default)]
    pub duplicates: Vec<String>,
}

impl AuditEntry {
    pub fn message(&self) -> String {
        format!(
            "Player {} plays more than once with: {}",
            self.key,
            self.duplicates.join(", ")
        )
    }
}

/// Schedule document: ordered rounds plus the advisory pairing audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schedule {
    pub rounds: Vec<Round>,
    pub audit: Vec<AuditEntry>,
}

impl Schedule {
    /// Reads every `round{n}` key of a schedule document, ordered by n.
    ///
    /// Each round is a list of teams; a team is either a slot->player mapping or a plain list.
    pub fn from_document(doc: &Value) -> Self {
        let Some(map) = doc.as_object() else {
            log::warn!("schedule document is not an object");
            return Self::default();
        };

        let mut rounds: Vec<Round> = map
            .iter()
            .filter_map(|(key, value)| {
                let index = round_index(key)?;
                let teams = value
                    .as_array()
                    .map(|teams| {
                        teams
                            .iter()
                            .enumerate()
                            .map(|(position, team)| Team {
                                key: team_key(position),
                                position,
                                members: team_members(team),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Some(Round {
                    key: key.clone(),
                    index,
                    teams,
                })
            })
            .collect();
        rounds.sort_by_key(|r| r.index);

        let audit = doc
            .get("audit")
            .and_then(|a| serde_json::from_value::<Vec<AuditEntry>>(a.clone()).ok())
            .unwrap_or_default();

        Self { rounds, audit }
    }

    pub fn round(&self, key: &str) -> Option<&Round> {
        self.rounds.iter().find(|r| r.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

fn team_members(team: &Value) -> Vec<PlayerRef> {
    match team {
        Value::Object(slots) => normalize_players(slots.values()),
        Value::Array(members) => normalize_players(members),
        other => normalize_players(std::iter::once(other)),
    }
}

/// One team's entry in the scores document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScore {
    pub key: String,
    pub position: usize,
    /// Lower is better; `None` until entered
    pub score: Option<f64>,
    pub players: Vec<PlayerRef>,
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundScores {
    pub key: String,
    pub index: u32,
    pub teams: Vec<TeamScore>,
}

impl RoundScores {
    pub fn has_any_score(&self) -> bool {
        self.teams.iter().any(|t| t.score.is_some())
    }

    pub fn team(&self, key: &str) -> Option<&TeamScore> {
        self.teams.iter().find(|t| t.key == key)
    }
}

/// Scores document: `{ rounds: { round: { teamKey: { score, players, teamName } } }, withdrawnPlayers }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoresDocument {
    pub rounds: Vec<RoundScores>,
    pub withdrawn_players: Vec<String>,
}

impl ScoresDocument {
    pub fn from_document(doc: &Value) -> Self {
        let mut rounds: Vec<RoundScores> = doc
            .get("rounds")
            .and_then(Value::as_object)
            .map(|rounds| {
                rounds
                    .iter()
                    .filter_map(|(key, teams)| {
                        let Some(index) = round_index(key) else {
                            log::warn!("ignoring scores for unrecognised round key {}", key);
                            return None;
                        };
                        Some(RoundScores {
                            key: key.clone(),
                            index,
                            teams: team_scores(teams),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        rounds.sort_by_key(|r| r.index);

        let withdrawn_players = doc
            .get("withdrawnPlayers")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            rounds,
            withdrawn_players,
        }
    }

    pub fn round(&self, key: &str) -> Option<&RoundScores> {
        self.rounds.iter().find(|r| r.key == key)
    }
}

fn team_scores(teams: &Value) -> Vec<TeamScore> {
    let Some(teams) = teams.as_object() else {
        return Vec::new();
    };

    let mut parsed: Vec<(Option<usize>, TeamScore)> = teams
        .iter()
        .map(|(key, data)| {
            let position = team_position(key);
            let team = TeamScore {
                key: key.clone(),
                position: position.unwrap_or(0),
                score: data.get("score").and_then(parse_score),
                players: data
                    .get("players")
                    .and_then(Value::as_array)
                    .map(|p| normalize_players(p))
                    .unwrap_or_default(),
                team_name: data
                    .get("teamName")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
            };
            (position, team)
        })
        .collect();

    // team keys that don't parse keep their document order after the numbered ones
    parsed.sort_by_key(|(position, _)| position.unwrap_or(usize::MAX));
    parsed
        .into_iter()
        .enumerate()
        .map(|(idx, (position, mut team))| {
            if position.is_none() {
                team.position = idx;
            }
            team
        })
        .collect()
}

/// Numbers and numeric strings are scores; null and blanks are "not entered".
fn parse_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
