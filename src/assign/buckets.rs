use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::roster::{identity_of, Player, SkillTier};

/// Errors raised while preparing a bucket assignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
    /// Illegal A/B/C counts.
    #[error("{0}")]
    InvalidConfiguration(String),
    #[error("player name is required")]
    EmptyName,
    /// Identity already present in one of the four buckets.
    #[error("player {0} is already on the roster")]
    DuplicatePlayer(String),
}

/// Column a player sits in during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Available,
    A,
    B,
    C,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Available, Bucket::A, Bucket::B, Bucket::C];

    pub fn for_tier(tier: SkillTier) -> Self {
        match tier {
            SkillTier::A => Bucket::A,
            SkillTier::B => Bucket::B,
            SkillTier::C => Bucket::C,
        }
    }
}

/// Number of players each tier must hold before finalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequiredCounts {
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "B")]
    pub b: usize,
    #[serde(rename = "C")]
    pub c: usize,
}

impl RequiredCounts {
    pub fn for_tier(&self, tier: SkillTier) -> usize {
        match tier {
            SkillTier::A => self.a,
            SkillTier::B => self.b,
            SkillTier::C => self.c,
        }
    }
}

/// A == C == `a_players`, the rest are B. `None` when that does not fit in `total_players`.
fn tier_split(total_players: usize, a_players: usize) -> Option<RequiredCounts> {
    let b = a_players
        .checked_mul(2)
        .and_then(|paired| total_players.checked_sub(paired))?;
    Some(RequiredCounts {
        a: a_players,
        b,
        c: a_players,
    })
}

/// Required tier counts for a tournament.
///
/// Every A-player is paired with a C-player, so A == C and the rest are B.
/// The scheduler needs either no A-players or at least four.
pub fn required_counts(
    total_players: usize,
    configured_a_players: usize,
) -> Result<RequiredCounts, AssignError> {
    if (1..=3).contains(&configured_a_players) {
        return Err(AssignError::InvalidConfiguration(
            "scheduling needs 0 or at least 4 A-players".to_string(),
        ));
    }

    tier_split(total_players, configured_a_players).ok_or_else(|| {
        AssignError::InvalidConfiguration(format!(
            "{} A-players and {} C-players do not fit in {} total players",
            configured_a_players, configured_a_players, total_players
        ))
    })
}

/// Reads required counts off a draft schedule document.
///
/// Prefers `aPlayers` + `totalPlayers`, falls back to the legacy `requiredPlayers: { A, B, C }`.
/// A generated schedule is taken as it is, so the 0-or-at-least-4 rule is not applied here.
pub fn required_counts_from_document(doc: &Value) -> Option<RequiredCounts> {
    let field = |key: &str| {
        doc.get(key)
            .and_then(Value::as_u64)
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
    };

    if let (Some(a), Some(total)) = (field("aPlayers"), field("totalPlayers")) {
        match tier_split(total, a) {
            Some(counts) => return Some(counts),
            None => log::warn!(
                "schedule document has {} A-players in {} total; no readiness check from those",
                a,
                total
            ),
        }
    }

    let legacy = doc.get("requiredPlayers")?;
    let tier = |key: &str| legacy.get(key).and_then(Value::as_u64).map(|n| n as usize);
    Some(RequiredCounts {
        a: tier("A")?,
        b: tier("B")?,
        c: tier("C")?,
    })
}

/// The four disjoint setup columns. A player identity lives in at most one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketState {
    pub available: Vec<Player>,
    pub a: Vec<Player>,
    pub b: Vec<Player>,
    pub c: Vec<Player>,
}

impl BucketState {
    /// Fresh state with every roster player available. Duplicate identities are dropped.
    pub fn from_roster(roster: Vec<Player>) -> Self {
        roster.into_iter().fold(Self::default(), |mut state, player| {
            if can_add_player(&state, &player.identity) {
                state.available.push(player);
            } else {
                log::warn!("dropping duplicate roster entry {}", player.identity);
            }
            state
        })
    }

    pub fn bucket(&self, bucket: Bucket) -> &[Player] {
        match bucket {
            Bucket::Available => &self.available,
            Bucket::A => &self.a,
            Bucket::B => &self.b,
            Bucket::C => &self.c,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Player> {
        match bucket {
            Bucket::Available => &mut self.available,
            Bucket::A => &mut self.a,
            Bucket::B => &mut self.b,
            Bucket::C => &mut self.c,
        }
    }

    /// Which bucket currently holds `identity`
    pub fn bucket_of(&self, identity: &str) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|b| self.bucket(*b).iter().any(|p| p.identity == identity))
    }

    pub fn find(&self, identity: &str) -> Option<&Player> {
        Bucket::ALL
            .into_iter()
            .flat_map(|b| self.bucket(b).iter())
            .find(|p| p.identity == identity)
    }

    /// Body for the finalize call: the three tier columns.
    pub fn finalize_payload(&self) -> FinalizePayload<'_> {
        FinalizePayload {
            a: &self.a,
            b: &self.b,
            c: &self.c,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FinalizePayload<'a> {
    pub a: &'a [Player],
    pub b: &'a [Player],
    pub c: &'a [Player],
}

/// True when `identity` is not in any bucket yet.
///
/// Compared on canonical identity, case-sensitive, so "AK" and "Alan King (AK)" collide.
pub fn can_add_player(state: &BucketState, identity: &str) -> bool {
    let wanted = identity_of(identity);
    !Bucket::ALL
        .into_iter()
        .flat_map(|b| state.bucket(b).iter())
        .any(|p| identity_of(&p.identity) == wanted)
}

/// Adds a new player to the available column.
pub fn add_player(
    mut state: BucketState,
    identity: &str,
    tier: SkillTier,
) -> Result<BucketState, AssignError> {
    let identity = identity.trim();
    if identity.is_empty() {
        return Err(AssignError::EmptyName);
    }
    if !can_add_player(&state, identity) {
        return Err(AssignError::DuplicatePlayer(identity.to_string()));
    }
    state.available.push(Player::new(identity, tier));
    Ok(state)
}

/// Moves a player between columns as a single remove-then-append.
///
/// Removal from `from` is best effort. The append is skipped when the identity
/// is still held by another column, so a player never ends up in two buckets.
pub fn move_player_bucket(
    mut state: BucketState,
    player: &Player,
    from: Bucket,
    to: Bucket,
) -> BucketState {
    if from == to {
        return state;
    }

    state
        .bucket_mut(from)
        .retain(|p| p.identity != player.identity);

    if let Some(holder) = state.bucket_of(&player.identity) {
        log::warn!(
            "{} is in {:?}, not {:?}; leaving it there",
            player.identity,
            holder,
            from
        );
        return state;
    }

    state.bucket_mut(to).push(player.clone());
    state
}

/// One tier whose column does not match the required count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierMismatch {
    pub tier: SkillTier,
    pub have: usize,
    pub need: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub mismatches: Vec<TierMismatch>,
}

/// Structural check that A, B and C hold exactly the required counts.
pub fn readiness(state: &BucketState, required: &RequiredCounts) -> Readiness {
    let mismatches: Vec<TierMismatch> = SkillTier::ALL
        .into_iter()
        .filter_map(|tier| {
            let have = state.bucket(Bucket::for_tier(tier)).len();
            let need = required.for_tier(tier);
            (have != need).then_some(TierMismatch { tier, have, need })
        })
        .collect();

    Readiness {
        ready: mismatches.is_empty(),
        mismatches,
    }
}
