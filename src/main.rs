use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use tournament_admin::assign::required_counts;
use tournament_admin::config::Config;
use tournament_admin::display::{print_leaderboard, print_round_board, write_leaderboard_to_file};
use tournament_admin::schedule::{Schedule, ScoresDocument};
use tournament_admin::standings::{leaderboard_from_documents, team_scores_for_round, WithdrawalSet};
use tournament_admin::web;

#[derive(Parser)]
#[command(name = "tournament-admin", about = "Run and score team tournaments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the organizer web server
    Serve {
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the leaderboard from saved score and schedule documents
    Leaderboard {
        #[arg(long)]
        scores: PathBuf,
        #[arg(long)]
        schedule: Option<PathBuf>,
        /// Show one round's team board instead
        #[arg(long)]
        round: Option<String>,
        /// Also write the leaderboard as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show how many A, B and C players a field needs
    RequiredCounts {
        #[arg(long)]
        total: usize,
        #[arg(long = "a-players")]
        a_players: usize,
    },
}

fn read_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    tournament_admin::service::decode_document(&text)
        .with_context(|| format!("parsing {}", path.display()))
}

fn leaderboard(
    scores_path: &Path,
    schedule_path: Option<&Path>,
    round: Option<&str>,
    csv_path: Option<&Path>,
) -> Result<()> {
    let scores = ScoresDocument::from_document(&read_document(scores_path)?);
    let schedule = schedule_path
        .map(|p| read_document(p).map(|doc| Schedule::from_document(&doc)))
        .transpose()?;

    if let Some(round) = round {
        let withdrawn = WithdrawalSet::from_list(scores.withdrawn_players.iter().cloned());
        let rows = team_scores_for_round(
            round,
            scores.round(round),
            schedule.as_ref().and_then(|s| s.round(round)),
            &withdrawn,
        );
        print_round_board(round, &rows);
    }

    let board = leaderboard_from_documents(&scores, schedule.as_ref());
    if round.is_none() {
        print_leaderboard(&board);
    }

    if let Some(csv_path) = csv_path {
        let filename = csv_path.to_string_lossy();
        write_leaderboard_to_file(&board, &filename)
            .with_context(|| format!("writing {}", csv_path.display()))?;
        println!("Leaderboard saved to {}", csv_path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            let mut config = Config::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            println!("Starting web server on port {}...", config.port);
            println!("Access the API at http://localhost:{}/api", config.port);
            web::start_server(config).await?;
        }
        Command::Leaderboard {
            scores,
            schedule,
            round,
            csv,
        } => leaderboard(&scores, schedule.as_deref(), round.as_deref(), csv.as_deref())?,
        Command::RequiredCounts { total, a_players } => {
            let counts = required_counts(total, a_players)?;
            println!("A: {}  B: {}  C: {}", counts.a, counts.b, counts.c);
        }
    }
    Ok(())
}
