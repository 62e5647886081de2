use std::fs::File;
use std::io;

use crate::schedule::round_index;
use crate::standings::{Leaderboard, TeamRow};

/// Formats a score without a trailing ".0" for whole numbers
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

/// Formats an optional round cell, "-" when the player has no score there
pub fn format_cell(score: Option<f64>) -> String {
    score.map(format_score).unwrap_or_else(|| "-".to_string())
}

/// Column title for a round key: "round3" -> "R3"
pub fn round_column(round_key: &str) -> String {
    match round_index(round_key) {
        Some(index) => format!("R{}", index),
        None => round_key.to_string(),
    }
}

/// Header row shared by the terminal table and the CSV export.
pub fn leaderboard_header(board: &Leaderboard) -> Vec<String> {
    let mut header = vec!["Place".to_string(), "Player".to_string(), "Total".to_string()];
    header.extend(board.rounds.iter().map(|r| round_column(r)));
    header
}

fn leaderboard_records(board: &Leaderboard) -> Vec<Vec<String>> {
    board
        .rows
        .iter()
        .map(|row| {
            let mut record = vec![row.place.clone(), row.identity.clone(), format_score(row.total)];
            record.extend(row.round_scores.iter().map(|s| format_cell(*s)));
            record
        })
        .collect()
}

/// Writes the leaderboard as CSV to any writer
pub fn write_leaderboard_csv<W: io::Write>(board: &Leaderboard, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(leaderboard_header(board))?;
    for record in leaderboard_records(board) {
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// The leaderboard CSV as a string, for download responses
pub fn leaderboard_csv(board: &Leaderboard) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_leaderboard_csv(board, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Writes the leaderboard CSV to a file
pub fn write_leaderboard_to_file(board: &Leaderboard, filename: &str) -> Result<(), csv::Error> {
    let file = File::create(filename)?;
    write_leaderboard_csv(board, file)
}

/// Prints the individual leaderboard in a readable format
pub fn print_leaderboard(board: &Leaderboard) {
    println!("\n=== Leaderboard ===");
    if board.is_empty() {
        println!("No scores recorded yet.");
        return;
    }

    let header = leaderboard_header(board);
    let records = leaderboard_records(board);

    // widest cell per column
    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            records
                .iter()
                .map(|r| r[col].len())
                .chain(std::iter::once(header[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(&header));
    for record in &records {
        println!("{}", line(record));
    }

    let withdrawn = board.rows.iter().filter(|r| r.withdrawn).count();
    if withdrawn > 0 {
        println!("\n{} withdrawn player(s) listed as WD", withdrawn);
    }
}

/// Prints one round's team board
pub fn print_round_board(round_key: &str, rows: &[TeamRow]) {
    println!("\n=== {} ===", round_column(round_key));
    if rows.is_empty() {
        println!("No teams for this round.");
        return;
    }

    for row in rows {
        let players: Vec<String> = row
            .players
            .iter()
            .map(|p| {
                if p.withdrawn {
                    format!("{} (WD)", p.identity)
                } else {
                    p.identity.clone()
                }
            })
            .collect();
        println!(
            "  {:<8} {:>6}  {}",
            row.team_name,
            format_cell(row.score),
            players.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScoresDocument;
    use crate::standings::{build_leaderboard, compute_standings, WithdrawalSet};
    use serde_json::json;

    #[test]
    fn cells_and_columns() {
        assert_eq!(format_cell(Some(3.0)), "3");
        assert_eq!(format_cell(Some(2.5)), "2.5");
        assert_eq!(format_cell(None), "-");
        assert_eq!(round_column("round12"), "R12");
        assert_eq!(round_column("playoff"), "playoff");
    }

    #[test]
    fn csv_lists_places_and_round_cells() {
        let scores = ScoresDocument::from_document(&json!({
            "rounds": {
                "round1": {
                    "team1": {"players": ["Alan King (AK)", "Dave Mell (DM)"], "score": 3},
                    "team2": {"players": ["Rick King (RK)"], "score": 5}
                },
                "round2": {"team1": {"players": ["Rick King (RK)"], "score": 1}}
            }
        }));
        let standings = compute_standings(&scores.rounds);
        let withdrawn = WithdrawalSet::from_list(vec!["DM".to_string()]);
        let rounds = vec!["round1".to_string(), "round2".to_string()];
        let board = build_leaderboard(&standings, &withdrawn, &rounds);

        let csv = leaderboard_csv(&board).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Place,Player,Total,R1,R2",
                "1,AK,3,3,-",
                "2,RK,6,5,1",
                "WD,DM,3,3,-",
            ]
        );
    }
}
