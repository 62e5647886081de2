use serde::Serialize;

use super::totals::{PlayerTotal, Standings};
use super::withdrawal::WithdrawalSet;

/// Place label shown for withdrawn players
pub const WITHDRAWN_TAG: &str = "WD";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub identity: String,
    pub total: f64,
    pub place: usize,
    pub tied: bool,
}

/// Competition ranking over totals already sorted ascending: 1, 1, 3, 4.
///
/// A player level with the one before shares that place; both are marked tied.
pub fn compute_placements(sorted: &[PlayerTotal]) -> Vec<Placement> {
    let mut placements: Vec<Placement> = Vec::with_capacity(sorted.len());

    for (i, player) in sorted.iter().enumerate() {
        let level_with_prev = i > 0 && sorted[i - 1].total == player.total;
        let level_with_next = sorted
            .get(i + 1)
            .is_some_and(|next| next.total == player.total);

        let place = match placements.last() {
            Some(prev) if level_with_prev => prev.place,
            _ => i + 1,
        };

        placements.push(Placement {
            identity: player.identity.clone(),
            total: player.total,
            place,
            tied: level_with_prev || level_with_next,
        });
    }

    placements
}

/// One line of the individual leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    /// "1", "T3" or "WD"
    pub place: String,
    pub rank: Option<usize>,
    pub tied: bool,
    pub withdrawn: bool,
    pub identity: String,
    pub label: String,
    pub total: f64,
    /// Aligned with `Leaderboard::rounds`
    pub round_scores: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    pub rounds: Vec<String>,
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ranked players first, then withdrawn players tagged `WD` in their score order.
pub fn build_leaderboard(
    standings: &Standings,
    withdrawn: &WithdrawalSet,
    rounds: &[String],
) -> Leaderboard {
    let (out, active): (Vec<&PlayerTotal>, Vec<&PlayerTotal>) = standings
        .ranked
        .iter()
        .partition(|p| withdrawn.is_withdrawn(&p.label));

    let round_scores = |identity: &str| -> Vec<Option<f64>> {
        rounds
            .iter()
            .map(|r| standings.round_score(identity, r))
            .collect()
    };

    let active: Vec<PlayerTotal> = active.into_iter().cloned().collect();
    let mut rows: Vec<LeaderboardRow> = compute_placements(&active)
        .into_iter()
        .zip(&active)
        .map(|(placement, player)| LeaderboardRow {
            place: if placement.tied {
                format!("T{}", placement.place)
            } else {
                placement.place.to_string()
            },
            rank: Some(placement.place),
            tied: placement.tied,
            withdrawn: false,
            round_scores: round_scores(&player.identity),
            identity: placement.identity,
            label: player.label.clone(),
            total: placement.total,
        })
        .collect();

    rows.extend(out.into_iter().map(|player| LeaderboardRow {
        place: WITHDRAWN_TAG.to_string(),
        rank: None,
        tied: false,
        withdrawn: true,
        identity: player.identity.clone(),
        label: player.label.clone(),
        total: player.total,
        round_scores: round_scores(&player.identity),
    }));

    Leaderboard {
        rounds: rounds.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScoresDocument;
    use crate::standings::totals::compute_standings;
    use serde_json::json;

    fn totals(list: &[(&str, f64)]) -> Vec<PlayerTotal> {
        list.iter().map(|(id, t)| PlayerTotal::new(*id, *t)).collect()
    }

    #[test]
    fn ties_share_place_and_skip() {
        let placements = compute_placements(&totals(&[("P1", 3.0), ("P2", 3.0), ("P3", 5.0)]));
        let view: Vec<(&str, usize, bool)> = placements
            .iter()
            .map(|p| (p.identity.as_str(), p.place, p.tied))
            .collect();
        assert_eq!(view, vec![("P1", 1, true), ("P2", 1, true), ("P3", 3, false)]);
    }

    #[test]
    fn tie_in_the_middle() {
        let placements = compute_placements(&totals(&[
            ("a", 1.0),
            ("b", 2.0),
            ("c", 2.0),
            ("d", 2.0),
            ("e", 7.0),
        ]));
        let places: Vec<usize> = placements.iter().map(|p| p.place).collect();
        assert_eq!(places, vec![1, 2, 2, 2, 5]);
        assert!(!placements[0].tied);
        assert!(placements[3].tied);
        assert!(!placements[4].tied);
    }

    #[test]
    fn empty_input_has_no_placements() {
        assert!(compute_placements(&[]).is_empty());
    }

    #[test]
    fn withdrawn_players_go_to_the_tail() {
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {
                "round1": {
                    "team1": {"players": ["One (P1)"], "score": 3},
                    "team2": {"players": ["Two (P2)"], "score": 1},
                    "team3": {"players": ["Three (P3)"], "score": 5},
                    "team4": {"players": ["Four (P4)"], "score": 4}
                }
            }
        }));
        let standings = compute_standings(&scores.rounds);
        let withdrawn = WithdrawalSet::from_list(vec!["P2".to_string(), "Four (P4)".to_string()]);
        let board = build_leaderboard(&standings, &withdrawn, &["round1".to_string()]);

        let view: Vec<(&str, &str)> = board
            .rows
            .iter()
            .map(|r| (r.place.as_str(), r.identity.as_str()))
            .collect();
        assert_eq!(view, vec![("1", "P1"), ("2", "P3"), ("WD", "P2"), ("WD", "P4")]);
        assert_eq!(board.rows[2].round_scores, vec![Some(1.0)]);
        assert_eq!(board.rows[2].rank, None);
    }

    #[test]
    fn withdrawal_stored_as_label_catches_bare_records() {
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {
                "round1": {"team1": {"players": ["AK"], "score": 2}, "team2": {"players": ["RK"], "score": 4}},
                "round2": {"team1": {"players": ["Alan King (AK)"], "score": 2}}
            },
            "withdrawnPlayers": ["Alan King (AK)"]
        }));
        let standings = compute_standings(&scores.rounds);
        let withdrawn = WithdrawalSet::from_list(scores.withdrawn_players.clone());
        let board = build_leaderboard(&standings, &withdrawn, &[]);

        let view: Vec<(&str, &str)> = board
            .rows
            .iter()
            .map(|r| (r.place.as_str(), r.identity.as_str()))
            .collect();
        assert_eq!(view, vec![("1", "RK"), ("WD", "AK")]);
    }

    #[test]
    fn tied_rows_are_labelled() {
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {"round1": {"team1": {"players": ["P1", "P2"], "score": 3}, "team2": {"players": ["P3"], "score": 5}}}
        }));
        let standings = compute_standings(&scores.rounds);
        let board = build_leaderboard(&standings, &WithdrawalSet::default(), &[]);
        let places: Vec<&str> = board.rows.iter().map(|r| r.place.as_str()).collect();
        assert_eq!(places, vec!["T1", "T1", "3"]);
    }
}
