use serde_json::json;

use tournament_admin::assign::{
    add_player, move_player_bucket, readiness, required_counts, required_counts_from_document,
    AssignError, Bucket, BucketState, RequiredCounts, SelectionError, SelectionState,
};
use tournament_admin::roster::{parse_roster, Player, SkillTier};

fn roster() -> Vec<Player> {
    parse_roster(&json!([
        {"player": "Alan King (AK)", "previousRank": "A"},
        {"player": "Dave Mell (DM)", "previousRank": "B"},
        {"player": "Rick King (RK)", "previousRank": "C"},
        {"player": "Tom Olson (TO)", "previousRank": "B"}
    ]))
}

#[test]
fn counts_pair_a_with_c() {
    let counts = required_counts(16, 4).unwrap();
    assert_eq!((counts.a, counts.b, counts.c), (4, 8, 4));
    assert_eq!(required_counts(12, 0).unwrap().b, 12);
    assert!(matches!(required_counts(12, 2), Err(AssignError::InvalidConfiguration(_))));
    assert!(matches!(required_counts(6, 4), Err(AssignError::InvalidConfiguration(_))));
}

#[test]
fn draft_document_supplies_the_counts() {
    let counts = required_counts_from_document(&json!({"totalPlayers": 8, "aPlayers": 0})).unwrap();
    assert_eq!((counts.a, counts.b, counts.c), (0, 8, 0));
    assert!(required_counts_from_document(&json!({"round1": []})).is_none());
}

#[test]
fn a_full_assignment_becomes_ready() {
    let mut state = BucketState::from_roster(roster());
    for player in roster() {
        let to = Bucket::for_tier(player.tier);
        state = move_player_bucket(state, &player, Bucket::Available, to);
    }
    assert!(state.available.is_empty());

    let check = readiness(&state, &RequiredCounts { a: 1, b: 2, c: 1 });
    assert!(check.ready);

    let state = add_player(state, "Nia Park (NP)", SkillTier::B).unwrap();
    let check = readiness(&state, &RequiredCounts { a: 1, b: 2, c: 1 });
    assert!(check.ready, "new players wait in the available column");

    let payload = serde_json::to_value(state.finalize_payload()).unwrap();
    assert_eq!(payload["a"][0]["player"], "Alan King (AK)");
    assert_eq!(payload["b"].as_array().map(Vec::len), Some(2));
}

#[test]
fn a_player_is_never_in_two_buckets() {
    let state = BucketState::from_roster(roster());
    let ak = state.find("Alan King (AK)").cloned().unwrap();

    let state = move_player_bucket(state, &ak, Bucket::Available, Bucket::A);
    // stale source column
    let state = move_player_bucket(state, &ak, Bucket::Available, Bucket::C);

    assert_eq!(state.bucket_of("Alan King (AK)"), Some(Bucket::A));
    assert!(state.c.is_empty());
    assert_eq!(
        add_player(state, " Alan King (AK) ", SkillTier::A),
        Err(AssignError::DuplicatePlayer("Alan King (AK)".to_string()))
    );
}

#[test]
fn selection_needs_eight_players() {
    let mut selection = SelectionState::new(roster());
    selection.select_all("", None);
    assert_eq!(selection.counts().total, 4);
    assert_eq!(
        selection.validate_for_generation(),
        Err(SelectionError::TooFewPlayers(4))
    );

    selection.clear(Some(SkillTier::B));
    assert_eq!(selection.counts().b, 0);
    assert_eq!(selection.counts().total, 2);
}
