//! Read model for the leaderboard: totals, placements, team boards and withdrawals.

pub mod withdrawal;
pub mod totals;
pub mod placement;
pub mod rounds;

use crate::schedule::{Schedule, ScoresDocument};

pub use withdrawal::{toggle_withdrawal, SaveWithdrawalsRequest, WithdrawalSet};
pub use totals::{compute_standings, PlayerTotal, Standings};
pub use placement::{build_leaderboard, compute_placements, Leaderboard, LeaderboardRow, Placement, WITHDRAWN_TAG};
pub use rounds::{available_rounds, team_scores_for_round, TeamMember, TeamRow};

/// Free-function form of [`WithdrawalSet::is_withdrawn`].
pub fn is_withdrawn(set: &WithdrawalSet, raw_player: &str) -> bool {
    set.is_withdrawn(raw_player)
}

/// Full individual leaderboard from a scores document, with round columns from both documents.
pub fn leaderboard_from_documents(scores: &ScoresDocument, schedule: Option<&Schedule>) -> Leaderboard {
    let withdrawn = WithdrawalSet::from_list(scores.withdrawn_players.iter().cloned());
    let rounds = available_rounds(Some(scores), schedule);
    let standings = compute_standings(&scores.rounds);
    build_leaderboard(&standings, &withdrawn, &rounds)
}
