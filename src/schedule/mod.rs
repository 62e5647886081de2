pub mod types;
pub mod naming;
pub mod movement;
pub mod scores;

pub use types::{AuditEntry, Round, RoundScores, Schedule, ScoresDocument, Team, TeamScore};
pub use naming::{default_team_name, display_team_name, round_index, team_key, team_position};
pub use movement::{check_occupancy, validate_move, MoveError, MoveRequest};
pub use scores::{build_save_request, ScoreEntry, ScoreEntryError, SaveScoresRequest};
