//! The `moviequiz play` command.
//!
//! Hosts the quiz controller in the terminal: questions and alerts are
//! printed by the UI context task, stdin lines become controller events.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use moviequiz_core::model::QuizStep;
use moviequiz_core::statistics::StatisticsStore;
use moviequiz_core::traits::{AlertModel, AlertPresenter, AlertResponder, EventSink, Renderer};
use moviequiz_core::ui::spawn_ui;
use moviequiz_core::{JsonStatisticsStore, QuizController, QuizEvent};
use moviequiz_suppliers::config::{create_supplier, load_config_from, SupplierConfig};

/// Prints questions and answer feedback to stdout.
struct TerminalRenderer {
    buttons_enabled: Arc<AtomicBool>,
}

impl Renderer for TerminalRenderer {
    fn show_question(&mut self, step: &QuizStep) {
        println!("\nQuestion {} {}", step.question_number, step.image);
        println!("{} [y/n]", step.question);
    }

    fn set_loading_visible(&mut self, visible: bool) {
        if visible {
            println!("Loading questions...");
        }
    }

    fn set_answer_buttons_enabled(&mut self, enabled: bool) {
        self.buttons_enabled.store(enabled, Ordering::SeqCst);
    }

    fn show_answer_highlight(&mut self, is_correct: bool) {
        if is_correct {
            println!("Correct!");
        } else {
            println!("Wrong.");
        }
    }

    fn clear_highlight(&mut self) {}
}

type PendingAlert = Arc<Mutex<Option<AlertResponder>>>;

/// Prints alerts and parks the responder until the player presses Enter.
struct TerminalAlerts {
    pending: PendingAlert,
}

impl AlertPresenter for TerminalAlerts {
    fn show_alert(&mut self, alert: AlertModel, responder: AlertResponder) {
        println!("\n== {} ==", alert.title);
        println!("{}", alert.message);
        println!("[Enter] {}   [q] Quit", alert.button_text);
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(responder);
    }
}

/// What a line of player input means.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Answer(bool),
    Confirm,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Input::Answer(true),
        "n" | "no" => Input::Answer(false),
        "" => Input::Confirm,
        "q" | "quit" => Input::Quit,
        _ => Input::Unknown,
    }
}

/// Forward stdin lines to the controller until quit or end of input.
async fn read_input(sink: EventSink, pending: PendingAlert, buttons_enabled: Arc<AtomicBool>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("failed to read input: {e}");
                break;
            }
        };

        match parse_input(&line) {
            Input::Answer(yes) => {
                if buttons_enabled.load(Ordering::SeqCst) {
                    sink.send(QuizEvent::Answer(yes));
                } else {
                    tracing::debug!("answer buttons disabled, ignoring input");
                }
            }
            Input::Confirm => {
                let responder = pending.lock().unwrap_or_else(PoisonError::into_inner).take();
                if let Some(responder) = responder {
                    responder.confirm();
                }
            }
            Input::Quit => break,
            Input::Unknown => println!("Answer with y or n, or q to quit."),
        }
    }
    sink.send(QuizEvent::Shutdown);
}

pub async fn execute(
    deck: Option<PathBuf>,
    config_path: Option<PathBuf>,
    questions: Option<usize>,
    answer_delay_ms: Option<u64>,
    history: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;

    if let Some(path) = deck {
        anyhow::ensure!(path.exists(), "deck file not found: {}", path.display());
        config.supplier = Some(SupplierConfig::Deck {
            path,
            shuffle: true,
        });
    }
    if let Some(n) = questions {
        config.questions_amount = n;
    }
    if let Some(ms) = answer_delay_ms {
        config.answer_delay_ms = ms;
    }
    if let Some(path) = history {
        config.history_path = path;
    }

    anyhow::ensure!(
        config.questions_amount >= 1,
        "questions must be at least 1"
    );
    let supplier_config = config.supplier.as_ref().context(
        "no question supplier configured. Pass --deck or run `moviequiz init` to create a config file",
    )?;
    let supplier = create_supplier(supplier_config)?;

    if let Some(parent) = config.history_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create history directory: {}", parent.display())
            })?;
        }
    }
    let store = JsonStatisticsStore::open(&config.history_path)
        .with_context(|| format!("failed to open history: {}", config.history_path.display()))?;

    let buttons_enabled = Arc::new(AtomicBool::new(true));
    let pending: PendingAlert = Arc::new(Mutex::new(None));

    let (ui, ui_task) = spawn_ui(
        TerminalRenderer {
            buttons_enabled: Arc::clone(&buttons_enabled),
        },
        TerminalAlerts {
            pending: Arc::clone(&pending),
        },
    );
    let (sink, events) = EventSink::channel();
    let input_task = tokio::spawn(read_input(sink.clone(), pending, buttons_enabled));

    eprintln!(
        "moviequiz v{}: {} questions per round from {}",
        env!("CARGO_PKG_VERSION"),
        config.questions_amount,
        supplier.name()
    );

    let mut controller = QuizController::new(
        supplier,
        Box::new(store),
        ui,
        sink,
        config.controller_config(),
    );
    let outcome = controller.run(events).await;

    let games_played = controller.statistics().games_count();
    drop(controller);
    input_task.abort();
    if let Err(e) = ui_task.await {
        tracing::debug!("UI task ended abnormally: {e}");
    }

    outcome?;
    println!("\nThanks for playing! Quizzes played: {games_played}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_mapping() {
        assert_eq!(parse_input("y"), Input::Answer(true));
        assert_eq!(parse_input(" YES "), Input::Answer(true));
        assert_eq!(parse_input("n"), Input::Answer(false));
        assert_eq!(parse_input(""), Input::Confirm);
        assert_eq!(parse_input("q"), Input::Quit);
        assert_eq!(parse_input("maybe"), Input::Unknown);
    }
}
