use serde::Serialize;

use super::withdrawal::WithdrawalSet;
use crate::roster::PlayerRef;
use crate::schedule::{display_team_name, round_index, Round, RoundScores, Schedule, ScoresDocument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub identity: String,
    pub label: String,
    pub withdrawn: bool,
}

/// One line of a round's team board.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRow {
    pub team: String,
    pub team_name: String,
    pub score: Option<f64>,
    pub has_score: bool,
    pub players: Vec<TeamMember>,
}

fn members(players: &[PlayerRef], withdrawn: &WithdrawalSet) -> Vec<TeamMember> {
    players
        .iter()
        .map(|p| TeamMember {
            identity: p.identity.clone(),
            label: p.label.clone(),
            withdrawn: withdrawn.is_withdrawn(&p.label),
        })
        .collect()
}

/// Team board for one round.
///
/// Once any team in the round has a score, stored teams are listed scored-ascending then
/// unscored. Before that, every scheduled team is listed in schedule order under its
/// starting-hole name.
pub fn team_scores_for_round(
    round_key: &str,
    scores: Option<&RoundScores>,
    schedule: Option<&Round>,
    withdrawn: &WithdrawalSet,
) -> Vec<TeamRow> {
    let index = scores
        .map(|s| s.index)
        .or_else(|| schedule.map(|r| r.index))
        .or_else(|| round_index(round_key))
        .unwrap_or(1);

    if let Some(scores) = scores.filter(|s| s.has_any_score()) {
        let mut rows: Vec<TeamRow> = scores
            .teams
            .iter()
            .map(|team| {
                // fall back to the scheduled members when the score record lost its list
                let players = match schedule.and_then(|r| r.team(&team.key)) {
                    Some(scheduled) if team.players.is_empty() => &scheduled.members,
                    _ => &team.players,
                };
                TeamRow {
                    team: team.key.clone(),
                    team_name: display_team_name(team.team_name.as_deref(), index, team.position),
                    score: team.score,
                    has_score: team.score.is_some(),
                    players: members(players, withdrawn),
                }
            })
            .collect();

        rows.sort_by(|a, b| match (a.score, b.score) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        return rows;
    }

    let custom_name = |key: &str| {
        scores
            .and_then(|s| s.team(key))
            .and_then(|t| t.team_name.as_deref())
    };

    match schedule {
        Some(round) => round
            .teams
            .iter()
            .map(|team| TeamRow {
                team: team.key.clone(),
                team_name: display_team_name(custom_name(&team.key), index, team.position),
                score: None,
                has_score: false,
                players: members(&team.members, withdrawn),
            })
            .collect(),
        None => scores
            .map(|s| {
                s.teams
                    .iter()
                    .map(|team| TeamRow {
                        team: team.key.clone(),
                        team_name: display_team_name(team.team_name.as_deref(), index, team.position),
                        score: None,
                        has_score: false,
                        players: members(&team.players, withdrawn),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Union of the round keys known to the scores and the schedule, by round number.
pub fn available_rounds(scores: Option<&ScoresDocument>, schedule: Option<&Schedule>) -> Vec<String> {
    let mut rounds: Vec<(u32, String)> = Vec::new();
    let from_scores = scores
        .into_iter()
        .flat_map(|s| s.rounds.iter().map(|r| (r.index, r.key.clone())));
    let from_schedule = schedule
        .into_iter()
        .flat_map(|s| s.rounds.iter().map(|r| (r.index, r.key.clone())));

    for (index, key) in from_scores.chain(from_schedule) {
        if !rounds.iter().any(|(_, k)| *k == key) {
            rounds.push((index, key));
        }
    }
    rounds.sort_by_key(|(index, _)| *index);
    rounds.into_iter().map(|(_, key)| key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule() -> Schedule {
        Schedule::from_document(&json!({
            "round2": [
                {"p1": "Alan King (AK)", "p2": "Dave Mell (DM)"},
                {"p1": "Rick King (RK)", "p2": "Tom Olson (TO)"},
                {"p1": "Al Hilton (AH)", "p2": "Bob Lignell (BL)"}
            ]
        }))
    }

    #[test]
    fn before_scores_every_team_keeps_schedule_order() {
        let schedule = schedule();
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {"round2": {"team2": {"score": null, "players": [], "teamName": "Eagles"}}}
        }));
        let rows = team_scores_for_round(
            "round2",
            scores.round("round2"),
            schedule.round("round2"),
            &WithdrawalSet::default(),
        );
        let view: Vec<(&str, &str, bool)> = rows
            .iter()
            .map(|r| (r.team.as_str(), r.team_name.as_str(), r.has_score))
            .collect();
        assert_eq!(
            view,
            vec![("team1", "10a", false), ("team2", "Eagles", false), ("team3", "11a", false)]
        );
    }

    #[test]
    fn scored_teams_lead_in_ascending_order() {
        let schedule = schedule();
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {"round2": {
                "team1": {"score": 7, "players": ["Alan King (AK)", "Dave Mell (DM)"]},
                "team2": {"score": null, "players": ["Rick King (RK)", "Tom Olson (TO)"]},
                "team3": {"score": 2, "players": []}
            }}
        }));
        let withdrawn = WithdrawalSet::from_list(vec!["DM".to_string()]);
        let rows = team_scores_for_round("round2", scores.round("round2"), schedule.round("round2"), &withdrawn);

        let order: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, vec!["team3", "team1", "team2"]);
        assert!(!rows[2].has_score);
        // team3's score record had no players; the schedule fills them in
        assert_eq!(rows[0].players.len(), 2);
        assert!(rows[1].players[1].withdrawn);
        assert!(!rows[1].players[0].withdrawn);
    }

    #[test]
    fn withdrawn_flag_holds_in_every_round() {
        let schedule = Schedule::from_document(&json!({
            "round1": [["AK", "RK"]],
            "round2": [["Alan King (AK)", "Rick King (RK)"]]
        }));
        let withdrawn = WithdrawalSet::from_list(vec!["Alan King (AK)".to_string()]);
        for round in ["round1", "round2"] {
            let rows = team_scores_for_round(round, None, schedule.round(round), &withdrawn);
            assert!(rows[0].players[0].withdrawn, "{}", round);
            assert!(!rows[0].players[1].withdrawn, "{}", round);
        }
    }

    #[test]
    fn no_data_is_empty() {
        assert!(team_scores_for_round("round1", None, None, &WithdrawalSet::default()).is_empty());
    }

    #[test]
    fn rounds_merge_both_sources() {
        let schedule = Schedule::from_document(&json!({"round1": [], "round2": [], "round10": []}));
        let scores = ScoresDocument::from_document(&json!({"rounds": {"round2": {}, "round3": {}}}));
        assert_eq!(
            available_rounds(Some(&scores), Some(&schedule)),
            vec!["round1", "round2", "round3", "round10"]
        );
        assert!(available_rounds(None, None).is_empty());
    }
}
