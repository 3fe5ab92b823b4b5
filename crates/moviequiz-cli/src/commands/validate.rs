//! The `moviequiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(deck_path: PathBuf, questions_amount: usize) -> Result<()> {
    let decks = if deck_path.is_dir() {
        moviequiz_core::parser::load_deck_directory(&deck_path)?
    } else {
        vec![moviequiz_core::parser::parse_deck(&deck_path)?]
    };

    let mut total_warnings = 0;

    for deck in &decks {
        println!("Deck: {} ({} questions)", deck.name, deck.questions.len());

        let warnings = moviequiz_core::parser::validate_deck(deck, questions_amount);
        for w in &warnings {
            let prefix = w
                .question
                .map(|n| format!("  [#{n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All decks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
