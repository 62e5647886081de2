use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::types::{Round, RoundScores};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreEntryError {
    #[error("round {0} is not in the schedule")]
    UnknownRound(String),
    #[error("team {0} is not in this round")]
    UnknownTeam(String),
}

/// What an organizer types in for one team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, rename = "teamName")]
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScorePayload {
    pub score: Option<f64>,
    pub players: Vec<String>,
    #[serde(rename = "teamName", skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

/// Body of the service's save-scores call for one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveScoresRequest {
    pub round: String,
    #[serde(rename = "teamScores")]
    pub team_scores: BTreeMap<String, TeamScorePayload>,
}

/// Entries already stored for a round, keyed by team
pub fn existing_entries(scores: &RoundScores) -> HashMap<String, ScoreEntry> {
    scores
        .teams
        .iter()
        .map(|t| {
            (
                t.key.clone(),
                ScoreEntry {
                    score: t.score,
                    team_name: t.team_name.clone(),
                },
            )
        })
        .collect()
}

/// Overlays submitted entries on stored ones. A submission without a name keeps the stored name.
pub fn merge_entries(
    mut existing: HashMap<String, ScoreEntry>,
    submitted: HashMap<String, ScoreEntry>,
) -> HashMap<String, ScoreEntry> {
    for (team, entry) in submitted {
        let slot = existing.entry(team).or_default();
        slot.score = entry.score;
        if entry.team_name.is_some() {
            slot.team_name = entry.team_name;
        }
    }
    existing
}

/// Builds the save payload for every team of `round`, members taken from the schedule.
pub fn build_save_request(
    round: &Round,
    entries: &HashMap<String, ScoreEntry>,
) -> Result<SaveScoresRequest, ScoreEntryError> {
    if let Some(unknown) = entries.keys().find(|key| round.team(key).is_none()) {
        return Err(ScoreEntryError::UnknownTeam(unknown.clone()));
    }

    let team_scores = round
        .teams
        .iter()
        .map(|team| {
            let entry = entries.get(&team.key).cloned().unwrap_or_default();
            let payload = TeamScorePayload {
                score: entry.score,
                players: team.members.iter().map(|m| m.label.clone()).collect(),
                team_name: entry
                    .team_name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
            };
            (team.key.clone(), payload)
        })
        .collect();

    Ok(SaveScoresRequest {
        round: round.key.clone(),
        team_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::{Schedule, ScoresDocument};
    use serde_json::json;

    fn round() -> Round {
        Schedule::from_document(&json!({
            "round1": [
                {"p1": "Alan King (AK)", "p2": "Dave Mell (DM)"},
                {"p1": "Rick King (RK)", "p2": "Tom Olson (TO)"}
            ]
        }))
        .round("round1")
        .cloned()
        .unwrap()
    }

    #[test]
    fn payload_covers_every_team_with_labels() {
        let mut entries = HashMap::new();
        entries.insert(
            "team1".to_string(),
            ScoreEntry { score: Some(-3.0), team_name: Some(" Eagles ".to_string()) },
        );
        let request = build_save_request(&round(), &entries).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "round": "round1",
                "teamScores": {
                    "team1": {"score": -3.0, "players": ["Alan King (AK)", "Dave Mell (DM)"], "teamName": "Eagles"},
                    "team2": {"score": null, "players": ["Rick King (RK)", "Tom Olson (TO)"]}
                }
            })
        );
    }

    #[test]
    fn unknown_team_is_rejected() {
        let mut entries = HashMap::new();
        entries.insert("team9".to_string(), ScoreEntry::default());
        assert_eq!(
            build_save_request(&round(), &entries),
            Err(ScoreEntryError::UnknownTeam("team9".to_string()))
        );
    }

    #[test]
    fn merge_keeps_stored_names() {
        let stored = ScoresDocument::from_document(&json!({
            "rounds": {"round1": {"team1": {"score": 5, "players": [], "teamName": "Eagles"}}}
        }));
        let existing = existing_entries(stored.round("round1").unwrap());

        let mut submitted = HashMap::new();
        submitted.insert("team1".to_string(), ScoreEntry { score: Some(2.0), team_name: None });
        submitted.insert("team2".to_string(), ScoreEntry { score: Some(4.0), team_name: None });

        let merged = merge_entries(existing, submitted);
        assert_eq!(
            merged["team1"],
            ScoreEntry { score: Some(2.0), team_name: Some("Eagles".to_string()) }
        );
        assert_eq!(merged["team2"].score, Some(4.0));
    }
}
