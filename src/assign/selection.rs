use std::collections::HashSet;

use serde::Serialize;

use crate::assign::buckets::AssignError;
use crate::roster::{Player, SkillTier};

/// Smallest field the scheduler will build rounds for
pub const MIN_SELECTED_PLAYERS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("select at least 8 players to generate a schedule (selected {0})")]
    TooFewPlayers(usize),
    #[error(transparent)]
    Configuration(#[from] AssignError),
    #[error("player {0} is not on the roster")]
    UnknownPlayer(String),
}

/// Selected-player totals per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionCounts {
    pub total: usize,
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "B")]
    pub b: usize,
    #[serde(rename = "C")]
    pub c: usize,
}

/// Players-first setup: a roster and the subset picked for the event.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub roster: Vec<Player>,
    pub selected: HashSet<String>,
}

impl SelectionState {
    pub fn new(roster: Vec<Player>) -> Self {
        Self {
            roster,
            selected: HashSet::new(),
        }
    }

    /// Roster players whose identity contains `search` (case-insensitive), optionally limited to one tier.
    pub fn filtered(&self, search: &str, tier: Option<SkillTier>) -> Vec<&Player> {
        let needle = search.trim().to_lowercase();
        self.roster
            .iter()
            .filter(|p| p.identity.to_lowercase().contains(&needle))
            .filter(|p| tier.map_or(true, |t| p.tier == t))
            .collect()
    }

    pub fn is_selected(&self, identity: &str) -> bool {
        self.selected.contains(identity)
    }

    pub fn counts(&self) -> SelectionCounts {
        self.selected_players()
            .fold(SelectionCounts::default(), |mut counts, p| {
                counts.total += 1;
                match p.tier {
                    SkillTier::A => counts.a += 1,
                    SkillTier::B => counts.b += 1,
                    SkillTier::C => counts.c += 1,
                }
                counts
            })
    }

    /// Selected players in roster order
    pub fn selected_players(&self) -> impl Iterator<Item = &Player> {
        self.roster
            .iter()
            .filter(move |p| self.selected.contains(&p.identity))
    }

    pub fn toggle(&mut self, identity: &str) -> Result<bool, SelectionError> {
        if !self.roster.iter().any(|p| p.identity == identity) {
            return Err(SelectionError::UnknownPlayer(identity.to_string()));
        }
        if self.selected.remove(identity) {
            Ok(false)
        } else {
            self.selected.insert(identity.to_string());
            Ok(true)
        }
    }

    /// Selects every player passing the current filter.
    pub fn select_all(&mut self, search: &str, tier: Option<SkillTier>) {
        let picked: Vec<String> = self
            .filtered(search, tier)
            .into_iter()
            .map(|p| p.identity.clone())
            .collect();
        self.selected.extend(picked);
    }

    /// Clears the whole selection, or only the players of one tier.
    pub fn clear(&mut self, tier: Option<SkillTier>) {
        match tier {
            None => self.selected.clear(),
            Some(tier) => {
                for p in self.roster.iter().filter(|p| p.tier == tier) {
                    self.selected.remove(&p.identity);
                }
            }
        }
    }

    pub fn change_tier(&mut self, identity: &str, tier: SkillTier) -> Result<(), SelectionError> {
        let player = self
            .roster
            .iter_mut()
            .find(|p| p.identity == identity)
            .ok_or_else(|| SelectionError::UnknownPlayer(identity.to_string()))?;
        player.tier = tier;
        Ok(())
    }

    /// Gate before asking the scheduler for a players-first schedule.
    ///
    /// Only the player minimum and the 1..=3 A-player rule are checked; the scheduler judges the rest.
    pub fn validate_for_generation(&self) -> Result<SelectionCounts, SelectionError> {
        let counts = self.counts();
        if counts.total < MIN_SELECTED_PLAYERS {
            return Err(SelectionError::TooFewPlayers(counts.total));
        }
        if (1..=3).contains(&counts.a) {
            return Err(AssignError::InvalidConfiguration(format!(
                "scheduling needs 0 or at least 4 A-players (selected {})",
                counts.a
            ))
            .into());
        }
        Ok(counts)
    }
}
