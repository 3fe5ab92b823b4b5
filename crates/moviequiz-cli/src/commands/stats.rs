//! The `moviequiz stats` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use moviequiz_core::model::GameResult;
use moviequiz_core::statistics::{Statistics, StatisticsStore};
use moviequiz_core::JsonStatisticsStore;
use moviequiz_suppliers::config::load_config_from;

#[derive(Serialize)]
struct StatsOutput<'a> {
    #[serde(flatten)]
    statistics: Statistics,
    recent: &'a [GameResult],
}

pub fn execute(
    history_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    format: String,
    recent: usize,
) -> Result<()> {
    let history_path = match history_path {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.history_path,
    };

    let store = JsonStatisticsStore::open(&history_path)
        .with_context(|| format!("failed to open history: {}", history_path.display()))?;
    let history = store.history();
    let recent_games = &history[history.len().saturating_sub(recent)..];

    match format.as_str() {
        "json" => {
            let output = StatsOutput {
                statistics: store.statistics(),
                recent: recent_games,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            if history.is_empty() {
                println!("No games played yet.");
                return Ok(());
            }

            let stats = store.statistics();
            println!("Quizzes played: {}", stats.games_played);
            if let Some(best) = &stats.best_game {
                println!(
                    "Record: {}/{} ({})",
                    best.correct,
                    best.total,
                    best.date_time_string()
                );
            }
            println!("Average accuracy: {:.2}%", stats.total_accuracy);

            print_recent(recent_games);
        }
    }

    Ok(())
}

fn print_recent(games: &[GameResult]) {
    use comfy_table::{Cell, Table};

    if games.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Score", "Accuracy"]);

    for game in games.iter().rev() {
        let accuracy = if game.total == 0 {
            0.0
        } else {
            100.0 * f64::from(game.correct) / f64::from(game.total)
        };
        table.add_row(vec![
            Cell::new(game.date_time_string()),
            Cell::new(format!("{}/{}", game.correct, game.total)),
            Cell::new(format!("{accuracy:.1}%")),
        ]);
    }

    println!("\n{table}");
}
