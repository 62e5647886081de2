//! Tournament creation and pre-event setup: roster selection, schedule generation, bucket assignment.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{lock, AppState, AssignmentSetup};
use crate::assign::{
    add_player, move_player_bucket, readiness, required_counts, required_counts_from_document,
    Bucket, BucketState, SelectionError, SelectionState,
};
use crate::error::AppError;
use crate::roster::{Player, SkillTier};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Fresh tournament id: base-36 millisecond timestamp plus a random base-36 suffix.
pub fn new_tournament_id() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", to_base36(millis), suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupFlow {
    ScheduleFirst,
    PlayersFirst,
}

impl SetupFlow {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "schedule-first" => Some(SetupFlow::ScheduleFirst),
            "players-first" => Some(SetupFlow::PlayersFirst),
            _ => None,
        }
    }

    /// Where the organizer goes after creating the tournament
    pub fn next_step(&self, tournament_id: &str) -> String {
        match self {
            SetupFlow::ScheduleFirst => "/api/schedule/generate".to_string(),
            SetupFlow::PlayersFirst => format!("/api/tournaments/{}/selection/load", tournament_id),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateTournamentRequest {
    name: Option<String>,
    flow: Option<String>,
}

fn parse_tier(raw: Option<&str>) -> Result<Option<SkillTier>, AppError> {
    match raw.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(None),
        Some(t) => SkillTier::parse(t)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("unknown tier {}", t))),
    }
}

fn parse_bucket(raw: &str) -> Result<Bucket, AppError> {
    serde_json::from_value(Value::String(raw.trim().to_lowercase()))
        .map_err(|_| AppError::BadRequest(format!("unknown bucket {}", raw)))
}

pub async fn create_tournament(
    req: web::Json<CreateTournamentRequest>,
) -> Result<HttpResponse, AppError> {
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("tournament name is required".to_string()))?;
    let flow = req
        .flow
        .as_deref()
        .and_then(SetupFlow::parse)
        .ok_or_else(|| {
            AppError::BadRequest("choose a setup flow: schedule-first or players-first".to_string())
        })?;

    let id = new_tournament_id();
    log::info!("created tournament {} ({})", id, name);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "tournamentId": id,
        "name": name,
        "flow": flow,
        "nextStep": flow.next_step(&id),
    })))
}

pub async fn get_roster(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let players = state.client.roster(&state.config.organization).await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "players": players})))
}

// Players-first selection

#[derive(Serialize)]
struct SelectionRow<'a> {
    #[serde(flatten)]
    player: &'a Player,
    selected: bool,
}

#[derive(Deserialize)]
pub struct SelectionQuery {
    #[serde(default)]
    search: String,
    tier: Option<String>,
}

#[derive(Deserialize)]
pub struct PlayerRequest {
    player: String,
    tier: Option<String>,
}

#[derive(Deserialize)]
pub struct ClearRequest {
    tier: Option<String>,
}

fn selection_view(selection: &SelectionState, search: &str, tier: Option<SkillTier>) -> Value {
    let players: Vec<SelectionRow> = selection
        .filtered(search, tier)
        .into_iter()
        .map(|player| SelectionRow {
            selected: selection.is_selected(&player.identity),
            player,
        })
        .collect();
    let problem = selection.validate_for_generation().err().map(|e| e.to_string());
    json!({
        "success": true,
        "players": players,
        "counts": selection.counts(),
        "canGenerate": problem.is_none(),
        "problem": problem,
    })
}

fn with_selection<T>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut SelectionState) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut selections = lock(&state.selections);
    let selection = selections
        .get_mut(id)
        .ok_or_else(|| AppError::NoSetup(id.to_string()))?;
    f(selection)
}

pub async fn load_selection(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let roster = state.client.roster(&state.config.organization).await?;
    log::info!("loaded {} roster players for {}", roster.len(), id);
    let selection = SelectionState::new(roster);
    let view = selection_view(&selection, "", None);
    lock(&state.selections).insert(id.into_inner(), selection);
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_selection(
    id: web::Path<String>,
    query: web::Query<SelectionQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tier = parse_tier(query.tier.as_deref())?;
    let view = with_selection(&state, &id, |s| Ok(selection_view(s, &query.search, tier)))?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn toggle_selection(
    id: web::Path<String>,
    req: web::Json<PlayerRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (selected, counts) = with_selection(&state, &id, |s| {
        let selected = s.toggle(&req.player)?;
        Ok((selected, s.counts()))
    })?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "player": req.player,
        "selected": selected,
        "counts": counts,
    })))
}

pub async fn select_all(
    id: web::Path<String>,
    req: web::Json<SelectionQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tier = parse_tier(req.tier.as_deref())?;
    let counts = with_selection(&state, &id, |s| {
        s.select_all(&req.search, tier);
        Ok(s.counts())
    })?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "counts": counts})))
}

pub async fn clear_selection(
    id: web::Path<String>,
    req: web::Json<ClearRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tier = parse_tier(req.tier.as_deref())?;
    let counts = with_selection(&state, &id, |s| {
        s.clear(tier);
        Ok(s.counts())
    })?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "counts": counts})))
}

pub async fn change_tier(
    id: web::Path<String>,
    req: web::Json<PlayerRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tier = parse_tier(req.tier.as_deref())?
        .ok_or_else(|| AppError::BadRequest("tier is required".to_string()))?;
    let counts = with_selection(&state, &id, |s| {
        s.change_tier(&req.player, tier)?;
        Ok(s.counts())
    })?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "counts": counts})))
}

pub async fn generate_players_first(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // validate and snapshot under the lock, call the service without it
    let selected: Vec<Player> = with_selection(&state, &id, |s| {
        s.validate_for_generation()?;
        Ok(s.selected_players().cloned().collect())
    })?;
    let refs: Vec<&Player> = selected.iter().collect();

    let schedule_id = state.client.generate_players_first(&id, &refs).await?;
    lock(&state.selections).remove(id.as_str());
    log::info!("generated players-first schedule {} for {}", schedule_id, id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "scheduleId": schedule_id,
        "selectedPlayers": refs.len(),
    })))
}

// Schedule-first generation

#[derive(Deserialize)]
pub struct GenerateQuery {
    total: usize,
    a_players: usize,
}

#[derive(Deserialize)]
pub struct SaveScheduleRequest {
    schedule: Value,
}

pub async fn generate_schedule(
    query: web::Query<GenerateQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let required = required_counts(query.total, query.a_players)?;
    let schedule = state
        .client
        .generate_schedule(query.total, query.a_players)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "requiredCounts": required,
        "schedule": schedule,
    })))
}

pub async fn save_schedule(
    req: web::Json<SaveScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if req.schedule.is_null() {
        return Err(AppError::BadRequest("nothing to save: schedule is empty".to_string()));
    }
    let saved = state.client.save_schedule(&req.schedule).await?;
    log::info!("saved schedule {:?}", saved.share_id);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "url": saved.url,
        "shareId": saved.share_id,
    })))
}

// Bucket assignment

#[derive(Deserialize)]
pub struct BucketMoveRequest {
    player: String,
    from: String,
    to: String,
}

fn assignment_view(setup: &AssignmentSetup) -> Value {
    let check = setup.required.map(|r| readiness(&setup.buckets, &r));
    json!({
        "success": true,
        "available": setup.buckets.available,
        "a": setup.buckets.a,
        "b": setup.buckets.b,
        "c": setup.buckets.c,
        "requiredCounts": setup.required,
        "readiness": check,
    })
}

pub async fn get_assignment(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let assignments = lock(&state.assignments);
    let setup = assignments
        .get(id.as_str())
        .ok_or_else(|| AppError::NoSetup(id.to_string()))?;
    Ok(HttpResponse::Ok().json(assignment_view(setup)))
}

/// Starts an assignment from the organization roster. Required counts come from the draft schedule.
pub async fn load_assignment(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (roster, draft) = tokio::join!(
        state.client.roster(&state.config.organization),
        state.client.draft_schedule(&id)
    );
    let roster = roster?;
    let required = match draft {
        Ok(doc) => required_counts_from_document(&doc),
        Err(e) => {
            log::warn!("no draft schedule for {}: {}", id, e);
            None
        }
    };

    let setup = AssignmentSetup {
        buckets: BucketState::from_roster(roster),
        required,
    };
    let view = assignment_view(&setup);
    lock(&state.assignments).insert(id.into_inner(), setup);
    Ok(HttpResponse::Ok().json(view))
}

pub async fn add_assignment_player(
    id: web::Path<String>,
    req: web::Json<PlayerRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tier = parse_tier(req.tier.as_deref())?.unwrap_or(SkillTier::B);
    let mut assignments = lock(&state.assignments);
    let setup = assignments.entry(id.to_string()).or_default();

    setup.buckets = add_player(setup.buckets.clone(), &req.player, tier)?;
    log::info!("added {} to {}", req.player.trim(), id);
    Ok(HttpResponse::Ok().json(assignment_view(setup)))
}

pub async fn move_assignment_player(
    id: web::Path<String>,
    req: web::Json<BucketMoveRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let from = parse_bucket(&req.from)?;
    let to = parse_bucket(&req.to)?;

    let mut assignments = lock(&state.assignments);
    let setup = assignments
        .get_mut(id.as_str())
        .ok_or_else(|| AppError::NoSetup(id.to_string()))?;
    let player = setup
        .buckets
        .find(&req.player)
        .cloned()
        .ok_or_else(|| AppError::from(SelectionError::UnknownPlayer(req.player.clone())))?;

    setup.buckets = move_player_bucket(std::mem::take(&mut setup.buckets), &player, from, to);
    Ok(HttpResponse::Ok().json(assignment_view(setup)))
}

/// Sends the A/B/C columns to the scheduler. Count mismatches are reported, not enforced.
pub async fn finalize_assignment(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let setup = lock(&state.assignments)
        .get(id.as_str())
        .cloned()
        .ok_or_else(|| AppError::NoSetup(id.to_string()))?;

    let check = setup.required.map(|r| readiness(&setup.buckets, &r));
    if let Some(check) = check.as_ref().filter(|c| !c.ready) {
        for m in &check.mismatches {
            log::warn!(
                "finalizing {} with {} {}-players, schedule expects {}",
                id,
                m.have,
                m.tier,
                m.need
            );
        }
    }

    let schedule = state
        .client
        .finalize_schedule(&id, &setup.buckets.finalize_payload())
        .await?;
    lock(&state.assignments).remove(id.as_str());
    log::info!("finalized schedule for {} ({} rounds)", id, schedule.rounds.len());

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "readiness": check,
        "rounds": schedule.rounds.len(),
    })))
}
