use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::schedule::RoundScores;

/// A player's accumulated score. Lower is better.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerTotal {
    pub identity: String,
    /// First label the player was recorded under
    pub label: String,
    pub total: f64,
}

impl PlayerTotal {
    pub fn new(identity: impl Into<String>, total: f64) -> Self {
        let identity = identity.into();
        Self {
            label: identity.clone(),
            identity,
            total,
        }
    }
}

/// Per-player aggregates, recomputed on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Standings {
    pub totals: HashMap<String, f64>,
    /// identity -> round key -> score
    pub per_round_scores: HashMap<String, HashMap<String, f64>>,
    /// Ascending by total; exact ties keep first-seen order
    pub ranked: Vec<PlayerTotal>,
}

impl Standings {
    pub fn round_score(&self, identity: &str, round: &str) -> Option<f64> {
        self.per_round_scores.get(identity)?.get(round).copied()
    }
}

/// Sums each player's team score over every scored team they appear on.
///
/// Unscored teams contribute nothing, so a player with no scored round has no total at all.
pub fn compute_standings(rounds: &[RoundScores]) -> Standings {
    let mut order: Vec<PlayerTotal> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();
    let mut per_round_scores: HashMap<String, HashMap<String, f64>> = HashMap::new();

    for round in rounds {
        for team in &round.teams {
            let Some(score) = team.score else {
                continue;
            };
            let mut seen = HashSet::new();
            for player in &team.players {
                if !seen.insert(player.identity.as_str()) {
                    continue;
                }
                let idx = *slot.entry(player.identity.clone()).or_insert_with(|| {
                    order.push(PlayerTotal {
                        identity: player.identity.clone(),
                        label: player.label.clone(),
                        total: 0.0,
                    });
                    order.len() - 1
                });
                order[idx].total += score;
                *per_round_scores
                    .entry(player.identity.clone())
                    .or_default()
                    .entry(round.key.clone())
                    .or_insert(0.0) += score;
            }
        }
    }

    let totals = order.iter().map(|p| (p.identity.clone(), p.total)).collect();
    // sort_by is stable, which keeps tie order
    order.sort_by(|a, b| a.total.total_cmp(&b.total));

    Standings {
        totals,
        per_round_scores,
        ranked: order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScoresDocument;
    use serde_json::json;

    #[test]
    fn totals_only_count_scored_rounds() {
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {
                "round1": {"team1": {"players": ["P1", "P2"], "score": 3}},
                "round2": {
                    "team1": {"players": ["P1"], "score": 5},
                    "team2": {"players": ["P3"], "score": null}
                }
            }
        }));
        let standings = compute_standings(&scores.rounds);
        assert_eq!(standings.totals["P1"], 8.0);
        assert_eq!(standings.totals["P2"], 3.0);
        assert!(!standings.totals.contains_key("P3"));
        assert_eq!(standings.round_score("P1", "round2"), Some(5.0));
        assert_eq!(standings.round_score("P2", "round2"), None);
    }

    #[test]
    fn ranked_ascending_and_stable() {
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {
                "round1": {
                    "team1": {"players": ["Z (z)"], "score": 4},
                    "team2": {"players": ["A (a)"], "score": 4},
                    "team3": {"players": ["M (m)"], "score": 2}
                }
            }
        }));
        let standings = compute_standings(&scores.rounds);
        let ids: Vec<&str> = standings.ranked.iter().map(|p| p.identity.as_str()).collect();
        assert_eq!(ids, vec!["m", "z", "a"]);
        assert_eq!(standings.ranked[1].label, "Z (z)");
    }

    #[test]
    fn labels_collapse_to_one_identity() {
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {
                "round1": {"team1": {"players": ["Alan King (AK)"], "score": 1}},
                "round2": {"team1": {"players": ["AK"], "score": 2}}
            }
        }));
        let standings = compute_standings(&scores.rounds);
        assert_eq!(standings.ranked.len(), 1);
        assert_eq!(standings.totals["AK"], 3.0);
    }
}
