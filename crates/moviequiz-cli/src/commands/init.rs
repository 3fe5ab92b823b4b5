//! The `moviequiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create moviequiz.toml
    if std::path::Path::new("moviequiz.toml").exists() {
        println!("moviequiz.toml already exists, skipping.");
    } else {
        std::fs::write("moviequiz.toml", SAMPLE_CONFIG)?;
        println!("Created moviequiz.toml");
    }

    // Create example deck
    std::fs::create_dir_all("decks")?;
    let example_path = std::path::Path::new("decks/example.toml");
    if example_path.exists() {
        println!("decks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DECK)?;
        println!("Created decks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add posters next to decks/example.toml, or switch moviequiz.toml to the imdb supplier");
    println!("  2. Run: moviequiz validate --deck decks/example.toml");
    println!("  3. Run: moviequiz play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# moviequiz configuration

questions_amount = 10
answer_delay_ms = 1000
# history_path = "./moviequiz-history.json"

[supplier]
type = "deck"
path = "decks/example.toml"
shuffle = true

# Online questions from a Top 250 movie API:
# [supplier]
# type = "imdb"
# api_key = "${MOVIEQUIZ_IMDB_KEY}"
"#;

const EXAMPLE_DECK: &str = r#"[deck]
id = "example"
name = "Example Deck"
description = "Ten well-known films to get started"

[[questions]]
text = "Is the rating of The Godfather greater than 6?"
correct_answer = true

[[questions]]
text = "Is the rating of The Dark Knight greater than 6?"
correct_answer = true

[[questions]]
text = "Is the rating of Kill Bill greater than 6?"
correct_answer = true

[[questions]]
text = "Is the rating of The Avengers greater than 6?"
correct_answer = true

[[questions]]
text = "Is the rating of Deadpool greater than 6?"
correct_answer = true

[[questions]]
text = "Is the rating of The Green Knight greater than 6?"
correct_answer = true

[[questions]]
text = "Is the rating of Old greater than 6?"
correct_answer = false

[[questions]]
text = "Is the rating of The Ice Age Adventures of Buck Wild greater than 6?"
correct_answer = false

[[questions]]
text = "Is the rating of Tesla greater than 6?"
correct_answer = false

[[questions]]
text = "Is the rating of Vivarium greater than 6?"
correct_answer = false
"#;
