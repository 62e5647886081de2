//! Event-day handlers: schedule views, score entry, withdrawals, moves and leaderboards.

use std::collections::HashMap;

use actix_web::{http::header, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::assign::required_counts_from_document;
use crate::display::{leaderboard_csv, round_column};
use crate::error::AppError;
use crate::roster::PlayerRef;
use crate::schedule::scores::{existing_entries, merge_entries};
use crate::schedule::{
    build_save_request, check_occupancy, display_team_name, validate_move, Schedule, ScoreEntry,
    ScoreEntryError, ScoresDocument,
};
use crate::standings::{
    leaderboard_from_documents, team_scores_for_round, toggle_withdrawal as toggle,
    SaveWithdrawalsRequest, WithdrawalSet,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamView<'a> {
    team: &'a str,
    team_name: String,
    players: &'a [PlayerRef],
}

#[derive(Serialize)]
struct RoundView<'a> {
    round: &'a str,
    label: String,
    teams: Vec<TeamView<'a>>,
}

#[derive(Serialize)]
struct AuditLine<'a> {
    key: &'a str,
    duplicates: &'a [String],
    message: String,
}

fn schedule_view(schedule: &Schedule, scores: Option<&ScoresDocument>) -> serde_json::Value {
    let rounds: Vec<RoundView> = schedule
        .rounds
        .iter()
        .map(|round| {
            let stored = scores.and_then(|s| s.round(&round.key));
            RoundView {
                round: &round.key,
                label: round.label(),
                teams: round
                    .teams
                    .iter()
                    .map(|team| {
                        let custom = stored
                            .and_then(|r| r.team(&team.key))
                            .and_then(|t| t.team_name.as_deref());
                        TeamView {
                            team: &team.key,
                            team_name: display_team_name(custom, round.index, team.position),
                            players: &team.members,
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    let audit: Vec<AuditLine> = schedule
        .audit
        .iter()
        .map(|entry| AuditLine {
            key: &entry.key,
            duplicates: &entry.duplicates,
            message: entry.message(),
        })
        .collect();

    json!({
        "success": true,
        "rounds": rounds,
        "audit": {"count": audit.len(), "entries": audit},
    })
}

/// Scores and schedule for one tournament. Either may be missing; the reader degrades to no data.
async fn event_documents(state: &AppState, id: &str) -> (ScoresDocument, Option<Schedule>) {
    let (scores, schedule) = tokio::join!(
        state.client.scores(id),
        state.client.finalized_schedule(id)
    );
    let scores = scores.unwrap_or_else(|e| {
        log::warn!("no scores for {}: {}", id, e);
        ScoresDocument::default()
    });
    let schedule = schedule
        .map_err(|e| log::warn!("no finalized schedule for {}: {}", id, e))
        .ok();
    (scores, schedule)
}

pub async fn get_schedule(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (schedule, scores) = tokio::join!(
        state.client.finalized_schedule(&id),
        state.client.scores(&id)
    );
    let schedule = schedule?;
    let scores = scores.map_err(|e| log::warn!("no scores for {}: {}", id, e)).ok();
    Ok(HttpResponse::Ok().json(schedule_view(&schedule, scores.as_ref())))
}

pub async fn get_draft(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let doc = state.client.draft_schedule(&id).await?;
    let schedule = Schedule::from_document(&doc);
    let mut view = schedule_view(&schedule, None);
    view["requiredCounts"] = json!(required_counts_from_document(&doc));
    Ok(HttpResponse::Ok().json(view))
}

// Scores

#[derive(Deserialize)]
pub struct SaveScoresBody {
    round: String,
    #[serde(default)]
    teams: HashMap<String, ScoreEntry>,
}

pub async fn get_scores(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id, round_key) = path.into_inner();
    let (schedule, scores) = tokio::join!(
        state.client.finalized_schedule(&id),
        state.client.scores(&id)
    );
    let schedule = schedule?;
    let round = schedule
        .round(&round_key)
        .ok_or_else(|| ScoreEntryError::UnknownRound(round_key.clone()))?;
    let scores = scores.unwrap_or_else(|e| {
        log::warn!("no scores for {}: {}", id, e);
        ScoresDocument::default()
    });
    let stored = scores.round(&round_key);

    let teams: Vec<serde_json::Value> = round
        .teams
        .iter()
        .map(|team| {
            let entry = stored.and_then(|r| r.team(&team.key));
            let custom = entry.and_then(|t| t.team_name.as_deref());
            json!({
                "team": team.key,
                "teamName": display_team_name(custom, round.index, team.position),
                "customName": custom,
                "score": entry.and_then(|t| t.score),
                "players": team.members,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "round": round.key,
        "label": round.label(),
        "teams": teams,
    })))
}

pub async fn save_scores(
    id: web::Path<String>,
    body: web::Json<SaveScoresBody>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (schedule, scores) = tokio::join!(
        state.client.finalized_schedule(&id),
        state.client.scores(&id)
    );
    let schedule = schedule?;
    let round = schedule
        .round(&body.round)
        .ok_or_else(|| ScoreEntryError::UnknownRound(body.round.clone()))?;

    let existing = scores
        .ok()
        .and_then(|doc| doc.round(&body.round).map(existing_entries))
        .unwrap_or_default();
    let request = build_save_request(round, &merge_entries(existing, body.teams))?;

    state.client.save_scores(&id, &request).await?;
    log::info!("saved {} scores for {}", request.round, id);
    Ok(HttpResponse::Ok().json(json!({"success": true, "round": request.round})))
}

// Withdrawals

#[derive(Deserialize)]
pub struct WithdrawalBody {
    player: String,
}

/// Flips one player's withdrawal and persists the whole set.
pub async fn toggle_withdrawal(
    id: web::Path<String>,
    body: web::Json<WithdrawalBody>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let player = body.player.trim();
    if player.is_empty() {
        return Err(AppError::BadRequest("player is required".to_string()));
    }

    // the current set must be known, or saving would drop other withdrawals
    let scores = state.client.scores(&id).await?;
    let set = toggle(WithdrawalSet::from_list(scores.withdrawn_players), player);

    state
        .client
        .save_withdrawals(&id, &SaveWithdrawalsRequest::from(&set))
        .await?;
    let withdrawn = set.contains(player);
    log::info!(
        "{} {} in {}",
        player,
        if withdrawn { "withdrawn" } else { "reinstated" },
        id
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "player": player,
        "withdrawn": withdrawn,
        "withdrawnPlayers": set,
    })))
}

// Moves

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBody {
    round: Option<String>,
    player_name: Option<String>,
    from_team: Option<String>,
    to_team: Option<String>,
}

/// Moves a player between teams. The service's copy is authoritative, so the schedule is re-read after.
pub async fn move_player(
    id: web::Path<String>,
    body: web::Json<MoveBody>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = validate_move(
        body.round.as_deref(),
        body.player_name.as_deref(),
        body.from_team.as_deref(),
        body.to_team.as_deref(),
    )?;

    let current = state.client.finalized_schedule(&id).await?;
    check_occupancy(&current, &request)?;

    state.client.move_player(&id, &request).await?;
    log::info!(
        "moved {} from {} to {} in {} of {}",
        request.player_name,
        request.from_team,
        request.to_team,
        request.round,
        id
    );

    let schedule = match state.client.finalized_schedule(&id).await {
        Ok(schedule) => Some(schedule_view(&schedule, None)),
        Err(e) => {
            log::warn!("move applied but schedule re-read failed for {}: {}", id, e);
            None
        }
    };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "move": request,
        "schedule": schedule,
    })))
}

// Leaderboards

pub async fn get_leaderboard(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (scores, schedule) = event_documents(&state, &id).await;
    let board = leaderboard_from_documents(&scores, schedule.as_ref());
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "rounds": board.rounds,
        "rows": board.rows,
    })))
}

pub async fn get_round_board(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id, round_key) = path.into_inner();
    let (scores, schedule) = event_documents(&state, &id).await;
    let withdrawn = WithdrawalSet::from_list(scores.withdrawn_players.iter().cloned());
    let rows = team_scores_for_round(
        &round_key,
        scores.round(&round_key),
        schedule.as_ref().and_then(|s| s.round(&round_key)),
        &withdrawn,
    );
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "round": round_key,
        "label": round_column(&round_key),
        "teams": rows,
    })))
}

pub async fn get_leaderboard_csv(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (scores, schedule) = event_documents(&state, &id).await;
    let board = leaderboard_from_documents(&scores, schedule.as_ref());
    let csv = leaderboard_csv(&board)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"leaderboard-{}.csv\"", id),
        ))
        .body(csv))
}
