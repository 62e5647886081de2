pub mod buckets;
pub mod selection;

pub use buckets::{
    add_player, can_add_player, move_player_bucket, readiness, required_counts,
    required_counts_from_document, AssignError, Bucket, BucketState, Readiness, RequiredCounts,
};
pub use selection::{SelectionCounts, SelectionError, SelectionState};
