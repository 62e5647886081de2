//! HTTP surface for organizers: tournament setup and event-day operations.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use actix_web::{middleware, web, App, HttpServer};

use crate::assign::{BucketState, RequiredCounts, SelectionState};
use crate::config::Config;
use crate::service::SchedulerClient;

pub mod event;
pub mod setup;

/// Bucket assignment in progress for one tournament.
#[derive(Debug, Clone, Default)]
pub struct AssignmentSetup {
    pub buckets: BucketState,
    /// Unknown when the draft schedule carried no counts
    pub required: Option<RequiredCounts>,
}

// Setup state is per-process; finished setups are dropped
pub struct AppState {
    pub config: Config,
    pub client: SchedulerClient,
    pub selections: Mutex<HashMap<String, SelectionState>>,
    pub assignments: Mutex<HashMap<String, AssignmentSetup>>,
}

impl AppState {
    pub fn new(config: Config, client: SchedulerClient) -> Self {
        Self {
            config,
            client,
            selections: Mutex::new(HashMap::new()),
            assignments: Mutex::new(HashMap::new()),
        }
    }
}

/// A poisoned lock still holds usable setup state
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registers every route. Shared by the server and the route tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/tournaments", web::post().to(setup::create_tournament))
        .route("/api/roster", web::get().to(setup::get_roster))
        .route("/api/schedule/generate", web::get().to(setup::generate_schedule))
        .route("/api/schedule/save", web::post().to(setup::save_schedule))
        .service(
            web::scope("/api/tournaments/{id}")
                .route("/selection", web::get().to(setup::get_selection))
                .route("/selection/load", web::post().to(setup::load_selection))
                .route("/selection/toggle", web::post().to(setup::toggle_selection))
                .route("/selection/select-all", web::post().to(setup::select_all))
                .route("/selection/clear", web::post().to(setup::clear_selection))
                .route("/selection/tier", web::post().to(setup::change_tier))
                .route("/selection/generate", web::post().to(setup::generate_players_first))
                .route("/assignment", web::get().to(setup::get_assignment))
                .route("/assignment/load-roster", web::post().to(setup::load_assignment))
                .route("/assignment/players", web::post().to(setup::add_assignment_player))
                .route("/assignment/move", web::post().to(setup::move_assignment_player))
                .route("/assignment/finalize", web::post().to(setup::finalize_assignment))
                .route("/schedule", web::get().to(event::get_schedule))
                .route("/draft", web::get().to(event::get_draft))
                .route("/scores", web::post().to(event::save_scores))
                .route("/scores/{round}", web::get().to(event::get_scores))
                .route("/withdrawals/toggle", web::post().to(event::toggle_withdrawal))
                .route("/move", web::post().to(event::move_player))
                .route("/leaderboard", web::get().to(event::get_leaderboard))
                .route("/leaderboard.csv", web::get().to(event::get_leaderboard_csv))
                .route("/leaderboard/{round}", web::get().to(event::get_round_board)),
        );
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let port = config.port;
    let client = SchedulerClient::new(&config.api_url, config.move_timeout)?;
    log::info!(
        "scheduling service at {}, organization {}",
        config.api_url,
        config.organization
    );
    let app_state = web::Data::new(AppState::new(config, client));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;
    Ok(())
}
