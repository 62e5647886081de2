use serde::{Deserialize, Serialize};

use super::types::Schedule;
use crate::roster::PlayerRef;

/// Local precondition failures for a move. None of these reach the scheduling service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("select a round, a player and both teams")]
    MissingSelection,
    #[error("source and target team are the same")]
    SameTeam,
    #[error("round {0} is not in the schedule")]
    UnknownRound(String),
    #[error("team {0} is not in this round")]
    UnknownTeam(String),
    #[error("{player} is not on {team}")]
    NotOnSourceTeam { player: String, team: String },
}

/// Body of the service's move call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub round: String,
    pub player_name: String,
    pub from_team: String,
    pub to_team: String,
}

fn selected(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Checks that every selection is made and the teams differ.
pub fn validate_move(
    round: Option<&str>,
    player: Option<&str>,
    from_team: Option<&str>,
    to_team: Option<&str>,
) -> Result<MoveRequest, MoveError> {
    let (Some(round), Some(player), Some(from_team), Some(to_team)) = (
        selected(round),
        selected(player),
        selected(from_team),
        selected(to_team),
    ) else {
        return Err(MoveError::MissingSelection);
    };

    if from_team == to_team {
        return Err(MoveError::SameTeam);
    }

    Ok(MoveRequest {
        round: round.to_string(),
        player_name: player.to_string(),
        from_team: from_team.to_string(),
        to_team: to_team.to_string(),
    })
}

/// Confirms against the current schedule that the player sits on the source team.
pub fn check_occupancy(schedule: &Schedule, request: &MoveRequest) -> Result<(), MoveError> {
    let round = schedule
        .round(&request.round)
        .ok_or_else(|| MoveError::UnknownRound(request.round.clone()))?;
    let from = round
        .team(&request.from_team)
        .ok_or_else(|| MoveError::UnknownTeam(request.from_team.clone()))?;
    round
        .team(&request.to_team)
        .ok_or_else(|| MoveError::UnknownTeam(request.to_team.clone()))?;

    if !from.has_member(&PlayerRef::from_label(request.player_name.as_str())) {
        return Err(MoveError::NotOnSourceTeam {
            player: request.player_name.clone(),
            team: request.from_team.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule() -> Schedule {
        Schedule::from_document(&json!({
            "round1": [
                {"p1": "Alan King (AK)", "p2": "Dave Mell (DM)"},
                {"p1": "Rick King (RK)", "p2": "Tom Olson (TO)"}
            ]
        }))
    }

    #[test]
    fn blank_selections_are_missing() {
        assert_eq!(
            validate_move(Some("round1"), Some(""), Some("team1"), Some("team2")),
            Err(MoveError::MissingSelection)
        );
        assert_eq!(
            validate_move(None, Some("X"), Some("team1"), Some("team2")),
            Err(MoveError::MissingSelection)
        );
    }

    #[test]
    fn same_team_is_rejected() {
        assert_eq!(
            validate_move(Some("round1"), Some("X"), Some("team1"), Some("team1")),
            Err(MoveError::SameTeam)
        );
    }

    #[test]
    fn request_uses_service_field_names() {
        let req = validate_move(Some("round1"), Some("AK"), Some("team1"), Some("team2")).unwrap();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"round": "round1", "playerName": "AK", "fromTeam": "team1", "toTeam": "team2"})
        );
    }

    #[test]
    fn occupancy_matches_label_or_identity() {
        let schedule = schedule();
        let by_identity = validate_move(Some("round1"), Some("AK"), Some("team1"), Some("team2")).unwrap();
        assert_eq!(check_occupancy(&schedule, &by_identity), Ok(()));

        let by_label =
            validate_move(Some("round1"), Some("Dave Mell (DM)"), Some("team1"), Some("team2")).unwrap();
        assert_eq!(check_occupancy(&schedule, &by_label), Ok(()));

        let wrong_team = validate_move(Some("round1"), Some("RK"), Some("team1"), Some("team2")).unwrap();
        assert!(matches!(
            check_occupancy(&schedule, &wrong_team),
            Err(MoveError::NotOnSourceTeam { .. })
        ));

        let bad_round = validate_move(Some("round9"), Some("AK"), Some("team1"), Some("team2")).unwrap();
        assert_eq!(
            check_occupancy(&schedule, &bad_round),
            Err(MoveError::UnknownRound("round9".to_string()))
        );

        let bad_team = validate_move(Some("round1"), Some("AK"), Some("team1"), Some("team7")).unwrap();
        assert_eq!(
            check_occupancy(&schedule, &bad_team),
            Err(MoveError::UnknownTeam("team7".to_string()))
        );
    }
}
