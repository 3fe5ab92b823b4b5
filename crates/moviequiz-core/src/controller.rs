//! Quiz controller.
//!
//! Receives events from the question supplier, the player and the alert
//! surface, drives the [`QuizEngine`], records finished rounds and posts
//! render calls to the UI context. Events are handled one at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::engine::{Advance, QuizEngine, DEFAULT_QUESTIONS_AMOUNT};
use crate::error::QuizError;
use crate::model::Question;
use crate::statistics::{Statistics, StatisticsStore};
use crate::traits::{
    AlertAction, AlertModel, AlertResponder, EventSink, EventStream, QuestionSupplier,
};
use crate::ui::UiHandle;

const ROUND_OVER_TITLE: &str = "This round is over";
const PLAY_AGAIN_BUTTON: &str = "Play again";
const ERROR_TITLE: &str = "Error";
const TRY_AGAIN_BUTTON: &str = "Try again";

/// Everything the controller reacts to.
#[derive(Debug)]
pub enum QuizEvent {
    /// The supplier finished loading its data.
    DataLoaded,
    /// Loading data or a question failed; carries the failure description.
    DataFailed(String),
    /// A requested question arrived. `generation` identifies the round the
    /// request was made in.
    QuestionReady {
        generation: u64,
        question: Option<Question>,
    },
    /// The player answered yes (`true`) or no (`false`).
    Answer(bool),
    /// The pause after showing an answer is over.
    AnswerDelayElapsed { ticket: u64 },
    /// The player pressed an alert's button.
    AlertConfirmed(AlertAction),
    /// Stop the controller loop.
    Shutdown,
}

/// Configuration for the quiz controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Questions per round.
    pub questions_amount: usize,
    /// How long answer feedback stays on screen.
    pub answer_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            questions_amount: DEFAULT_QUESTIONS_AMOUNT,
            answer_delay: Duration::from_secs(1),
        }
    }
}

/// A delayed continuation. Dropping it cancels the task.
#[derive(Debug)]
struct ScheduledTask {
    ticket: u64,
    handle: JoinHandle<()>,
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The quiz controller.
pub struct QuizController {
    engine: QuizEngine,
    statistics: Box<dyn StatisticsStore>,
    supplier: Arc<dyn QuestionSupplier>,
    ui: UiHandle,
    sink: EventSink,
    config: ControllerConfig,
    generation: u64,
    next_ticket: u64,
    pending: Option<ScheduledTask>,
}

impl QuizController {
    pub fn new(
        supplier: Arc<dyn QuestionSupplier>,
        statistics: Box<dyn StatisticsStore>,
        ui: UiHandle,
        sink: EventSink,
        config: ControllerConfig,
    ) -> Self {
        Self {
            engine: QuizEngine::new(config.questions_amount),
            statistics,
            supplier,
            ui,
            sink,
            config,
            generation: 0,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn engine(&self) -> &QuizEngine {
        &self.engine
    }

    pub fn statistics(&self) -> &dyn StatisticsStore {
        self.statistics.as_ref()
    }

    /// Returns `true` while an answer is on screen waiting to advance.
    pub fn has_pending_advance(&self) -> bool {
        self.pending.is_some()
    }

    /// Show the loading indicator and ask the supplier for its data.
    pub fn start(&mut self) {
        tracing::debug!(supplier = self.supplier.name(), "starting quiz");
        self.ui.set_loading_visible(true);
        self.load_data();
    }

    /// Start the quiz and process events until [`QuizEvent::Shutdown`] or
    /// until every sender is gone.
    ///
    /// Returns early if a finished round cannot be recorded.
    pub async fn run(&mut self, mut events: EventStream) -> Result<(), QuizError> {
        self.start();
        while let Some(event) = events.recv().await {
            let shutdown = matches!(event, QuizEvent::Shutdown);
            self.handle_event(event)?;
            if shutdown {
                break;
            }
        }
        self.pending = None;
        Ok(())
    }

    /// Handle a single event.
    pub fn handle_event(&mut self, event: QuizEvent) -> Result<(), QuizError> {
        match event {
            QuizEvent::DataLoaded => self.on_data_loaded(),
            QuizEvent::DataFailed(message) => self.on_data_failed(message),
            QuizEvent::QuestionReady {
                generation,
                question,
            } => self.on_question_ready(generation, question),
            QuizEvent::Answer(yes) => self.on_answer(yes),
            QuizEvent::AnswerDelayElapsed { ticket } => {
                return self.on_answer_delay_elapsed(ticket)
            }
            QuizEvent::AlertConfirmed(AlertAction::PlayAgain) => self.restart_round(),
            QuizEvent::AlertConfirmed(AlertAction::RetryLoad) => self.retry_load(),
            QuizEvent::Shutdown => self.pending = None,
        }
        Ok(())
    }

    /// Start a new round from the first question.
    ///
    /// The only place a round restarts: cancels any pending advance, resets
    /// the engine and requests the first question.
    pub fn restart_round(&mut self) {
        self.reset_round();
        self.ui.clear_highlight();
        self.ui.set_answer_buttons_enabled(true);
        self.request_next_question();
    }

    fn retry_load(&mut self) {
        self.reset_round();
        self.ui.set_loading_visible(true);
        self.load_data();
    }

    fn reset_round(&mut self) {
        self.pending = None;
        self.generation += 1;
        self.engine.restart();
    }

    fn on_data_loaded(&mut self) {
        self.ui.set_loading_visible(false);
        self.request_next_question();
    }

    fn on_data_failed(&mut self, message: String) {
        tracing::warn!("{}", QuizError::DataLoad(message.clone()));
        self.ui.set_loading_visible(false);
        self.ui.show_alert(
            AlertModel {
                title: ERROR_TITLE.to_string(),
                message,
                button_text: TRY_AGAIN_BUTTON.to_string(),
                action: AlertAction::RetryLoad,
            },
            AlertResponder::new(self.sink.clone(), AlertAction::RetryLoad),
        );
    }

    fn on_question_ready(&mut self, generation: u64, question: Option<Question>) {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "dropping question from an earlier round"
            );
            return;
        }
        let Some(question) = question else {
            tracing::debug!("supplier returned no question");
            return;
        };
        if let Some(step) = self.engine.present(question) {
            self.ui.show_question(step);
        }
    }

    fn on_answer(&mut self, yes: bool) {
        let Some(outcome) = self.engine.submit_answer(yes) else {
            tracing::debug!("ignoring answer with no open question");
            return;
        };

        self.ui.set_answer_buttons_enabled(false);
        self.ui.show_answer_highlight(outcome.is_correct);
        self.schedule_advance();
    }

    fn schedule_advance(&mut self) {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let delay = self.config.answer_delay;
        let sink = self.sink.clone();

        // Measured from the answer, not from when the task first runs.
        let deadline = tokio::time::Instant::now() + delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            sink.send(QuizEvent::AnswerDelayElapsed { ticket });
        });
        self.pending = Some(ScheduledTask { ticket, handle });
    }

    fn on_answer_delay_elapsed(&mut self, ticket: u64) -> Result<(), QuizError> {
        if !self.pending.as_ref().is_some_and(|task| task.ticket == ticket) {
            tracing::debug!(ticket, "ignoring stale continuation");
            return Ok(());
        }
        self.pending = None;

        self.ui.clear_highlight();
        self.ui.set_answer_buttons_enabled(true);

        match self.engine.advance_or_finish() {
            Some(Advance::Continue) => self.request_next_question(),
            Some(Advance::RoundComplete { correct, total }) => {
                self.finish_round(correct, total)?
            }
            None => tracing::debug!("no answer pending"),
        }
        Ok(())
    }

    fn finish_round(&mut self, correct: u32, total: u32) -> Result<(), QuizError> {
        self.statistics.record(correct, total)?;
        let stats = self.statistics.statistics();
        tracing::info!(correct, total, games_played = stats.games_played, "round complete");

        self.ui.show_alert(
            AlertModel {
                title: ROUND_OVER_TITLE.to_string(),
                message: round_summary(correct, total, &stats),
                button_text: PLAY_AGAIN_BUTTON.to_string(),
                action: AlertAction::PlayAgain,
            },
            AlertResponder::new(self.sink.clone(), AlertAction::PlayAgain),
        );
        Ok(())
    }

    fn load_data(&self) {
        let supplier = Arc::clone(&self.supplier);
        let sink = self.sink.clone();
        tokio::spawn(async move {
            match supplier.load_data().await {
                Ok(()) => sink.send(QuizEvent::DataLoaded),
                Err(e) => sink.send(QuizEvent::DataFailed(format!("{e:#}"))),
            }
        });
    }

    fn request_next_question(&self) {
        let supplier = Arc::clone(&self.supplier);
        let sink = self.sink.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            match supplier.next_question().await {
                Ok(question) => sink.send(QuizEvent::QuestionReady {
                    generation,
                    question,
                }),
                Err(e) => sink.send(QuizEvent::DataFailed(format!("{e:#}"))),
            }
        });
    }
}

/// The message shown when a round is over.
pub fn round_summary(correct: u32, total: u32, stats: &Statistics) -> String {
    let record = match &stats.best_game {
        Some(best) => format!("{}/{} {}", best.correct, best.total, best.date_time_string()),
        None => "none yet".to_string(),
    };
    format!(
        "Your result: {correct}/{total}\n\
         Number of quizzes played: {}\n\
         Your record: {record}\n\
         Average accuracy: {:.2}%",
        stats.games_played, stats.total_accuracy
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use crate::error::StatisticsError;
    use crate::history::InMemoryStatisticsStore;
    use crate::model::GameResult;
    use crate::ui::UiCommand;

    /// Hands out questions whose correct answer alternates yes/no.
    #[derive(Default)]
    struct ScriptedSupplier {
        fail_load: Mutex<VecDeque<String>>,
        load_calls: AtomicU32,
        next_calls: AtomicU32,
    }

    impl ScriptedSupplier {
        fn failing_once(message: &str) -> Self {
            let supplier = Self::default();
            supplier
                .fail_load
                .lock()
                .unwrap()
                .push_back(message.to_string());
            supplier
        }
    }

    #[async_trait]
    impl QuestionSupplier for ScriptedSupplier {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn load_data(&self) -> anyhow::Result<()> {
            self.load_calls.fetch_add(1, Ordering::Relaxed);
            match self.fail_load.lock().unwrap().pop_front() {
                Some(message) => Err(anyhow::anyhow!(message)),
                None => Ok(()),
            }
        }

        async fn next_question(&self) -> anyhow::Result<Option<Question>> {
            let n = self.next_calls.fetch_add(1, Ordering::Relaxed);
            Ok(Some(Question::new(
                Vec::new(),
                format!("Question {n}"),
                n % 2 == 0,
            )))
        }
    }

    /// Always fails to persist.
    struct BrokenStore;

    impl StatisticsStore for BrokenStore {
        fn record(&mut self, _: u32, _: u32) -> Result<GameResult, StatisticsError> {
            Err(StatisticsError::Io {
                path: "history.json".into(),
                source: std::io::Error::other("disk full"),
            })
        }

        fn history(&self) -> &[GameResult] {
            &[]
        }
    }

    struct Harness {
        controller: QuizController,
        supplier: Arc<ScriptedSupplier>,
        events: EventStream,
        ui: mpsc::UnboundedReceiver<UiCommand>,
    }

    impl Harness {
        fn new(
            supplier: ScriptedSupplier,
            store: Box<dyn StatisticsStore>,
            questions: usize,
        ) -> Self {
            let supplier = Arc::new(supplier);
            let (sink, events) = EventSink::channel();
            let (ui_handle, ui) = UiHandle::channel();
            let controller = QuizController::new(
                supplier.clone(),
                store,
                ui_handle,
                sink,
                ControllerConfig {
                    questions_amount: questions,
                    answer_delay: Duration::from_secs(1),
                },
            );
            Self {
                controller,
                supplier,
                events,
                ui,
            }
        }

        /// Let spawned tasks run and handle every event they produce.
        async fn settle(&mut self) -> Result<(), QuizError> {
            let mut idle_rounds = 0;
            while idle_rounds < 5 {
                tokio::task::yield_now().await;
                match self.events.try_recv() {
                    Ok(event) => {
                        idle_rounds = 0;
                        self.controller.handle_event(event)?;
                    }
                    Err(_) => idle_rounds += 1,
                }
            }
            Ok(())
        }

        async fn answer_and_wait(&mut self, yes: bool) -> Result<(), QuizError> {
            self.controller.handle_event(QuizEvent::Answer(yes))?;
            tokio::time::advance(Duration::from_secs(1)).await;
            self.settle().await
        }

        fn drain_ui(&mut self) -> Vec<UiCommand> {
            let mut commands = Vec::new();
            while let Ok(command) = self.ui.try_recv() {
                commands.push(command);
            }
            commands
        }
    }

    fn in_memory() -> Box<dyn StatisticsStore> {
        Box::new(InMemoryStatisticsStore::new())
    }

    fn shown_labels(commands: &[UiCommand]) -> Vec<String> {
        commands
            .iter()
            .filter_map(|c| match c {
                UiCommand::ShowQuestion(step) => Some(step.question_number.clone()),
                _ => None,
            })
            .collect()
    }

    fn take_alert(commands: Vec<UiCommand>) -> Option<(AlertModel, AlertResponder)> {
        commands.into_iter().find_map(|c| match c {
            UiCommand::ShowAlert(alert, responder) => Some((alert, responder)),
            _ => None,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn start_loads_data_and_shows_first_question() {
        let mut h = Harness::new(ScriptedSupplier::default(), in_memory(), 10);
        h.controller.start();
        h.settle().await.unwrap();

        let commands = h.drain_ui();
        assert!(matches!(commands[0], UiCommand::SetLoadingVisible(true)));
        assert!(matches!(commands[1], UiCommand::SetLoadingVisible(false)));
        assert_eq!(shown_labels(&commands), vec!["1/10"]);
        assert_eq!(h.supplier.load_calls.load(Ordering::Relaxed), 1);
        assert_eq!(h.supplier.next_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_shows_feedback_then_advances_after_delay() {
        let mut h = Harness::new(ScriptedSupplier::default(), in_memory(), 10);
        h.controller.start();
        h.settle().await.unwrap();
        h.drain_ui();

        // Question 0 expects "yes".
        h.controller.handle_event(QuizEvent::Answer(true)).unwrap();
        let commands = h.drain_ui();
        assert!(matches!(commands[0], UiCommand::SetAnswerButtonsEnabled(false)));
        assert!(matches!(commands[1], UiCommand::ShowAnswerHighlight(true)));
        assert!(h.controller.has_pending_advance());

        // Nothing happens before the delay is over.
        tokio::time::advance(Duration::from_millis(500)).await;
        h.settle().await.unwrap();
        assert!(h.drain_ui().is_empty());

        tokio::time::advance(Duration::from_millis(500)).await;
        h.settle().await.unwrap();
        let commands = h.drain_ui();
        assert!(matches!(commands[0], UiCommand::ClearHighlight));
        assert!(matches!(commands[1], UiCommand::SetAnswerButtonsEnabled(true)));
        assert_eq!(shown_labels(&commands), vec!["2/10"]);
        assert_eq!(h.controller.engine().correct_answers(), 1);
        assert!(!h.controller.has_pending_advance());
    }

    #[tokio::test(start_paused = true)]
    async fn full_round_records_once_and_shows_summary() {
        let mut h = Harness::new(ScriptedSupplier::default(), in_memory(), 3);
        h.controller.start();
        h.settle().await.unwrap();

        // Correct answers alternate yes/no/yes; answer yes every time.
        for _ in 0..3 {
            h.answer_and_wait(true).await.unwrap();
        }

        assert_eq!(h.controller.statistics().games_count(), 1);
        let (alert, responder) = take_alert(h.drain_ui()).expect("summary alert");
        assert_eq!(alert.title, "This round is over");
        assert_eq!(alert.button_text, "Play again");
        assert!(alert.message.starts_with("Your result: 2/3\n"));
        assert!(alert.message.contains("Number of quizzes played: 1"));
        assert!(alert.message.contains("Your record: 2/3 "));
        assert!(alert.message.ends_with("Average accuracy: 66.67%"));

        // Stray input while the summary is up changes nothing.
        h.controller.handle_event(QuizEvent::Answer(true)).unwrap();
        assert!(!h.controller.has_pending_advance());

        responder.confirm();
        h.settle().await.unwrap();
        assert_eq!(h.controller.engine().current_question_index(), 0);
        assert_eq!(h.controller.engine().correct_answers(), 0);
        assert_eq!(shown_labels(&h.drain_ui()), vec!["1/3"]);
        assert_eq!(h.controller.statistics().games_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn load_failure_shows_error_and_retries_on_confirm() {
        let mut h = Harness::new(
            ScriptedSupplier::failing_once("The Internet connection appears to be offline."),
            in_memory(),
            10,
        );
        h.controller.start();
        h.settle().await.unwrap();

        let (alert, responder) = take_alert(h.drain_ui()).expect("error alert");
        assert_eq!(alert.title, "Error");
        assert_eq!(alert.message, "The Internet connection appears to be offline.");
        assert_eq!(alert.button_text, "Try again");
        assert_eq!(h.supplier.load_calls.load(Ordering::Relaxed), 1);
        assert_eq!(h.supplier.next_calls.load(Ordering::Relaxed), 0);

        responder.confirm();
        h.settle().await.unwrap();
        assert_eq!(h.supplier.load_calls.load(Ordering::Relaxed), 2);
        assert_eq!(shown_labels(&h.drain_ui()), vec!["1/10"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_measured_from_the_answer() {
        let mut h = Harness::new(ScriptedSupplier::default(), in_memory(), 10);
        h.controller.start();
        h.settle().await.unwrap();
        h.drain_ui();

        // The clock moves before the delay task has had a chance to run.
        h.controller.handle_event(QuizEvent::Answer(true)).unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        h.settle().await.unwrap();

        assert_eq!(shown_labels(&h.drain_ui()), vec!["2/10"]);
        assert_eq!(h.controller.engine().current_question_index(), 1);
        assert!(!h.controller.has_pending_advance());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_pending_advance() {
        let mut h = Harness::new(ScriptedSupplier::default(), in_memory(), 10);
        h.controller.start();
        h.settle().await.unwrap();

        h.controller.handle_event(QuizEvent::Answer(true)).unwrap();
        assert!(h.controller.has_pending_advance());

        h.controller.restart_round();
        assert!(!h.controller.has_pending_advance());
        h.settle().await.unwrap();
        h.drain_ui();

        tokio::time::advance(Duration::from_secs(2)).await;
        h.settle().await.unwrap();
        assert_eq!(h.controller.engine().current_question_index(), 0);
        assert_eq!(h.controller.engine().correct_answers(), 0);
        assert!(h.drain_ui().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_continuation_is_ignored() {
        let mut h = Harness::new(ScriptedSupplier::default(), in_memory(), 10);
        h.controller.start();
        h.settle().await.unwrap();
        h.drain_ui();

        h.controller
            .handle_event(QuizEvent::AnswerDelayElapsed { ticket: 42 })
            .unwrap();
        assert!(h.drain_ui().is_empty());
        assert_eq!(h.controller.engine().current_question_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_before_question_is_noop() {
        let mut h = Harness::new(ScriptedSupplier::default(), in_memory(), 10);
        h.controller.handle_event(QuizEvent::Answer(true)).unwrap();
        assert!(h.drain_ui().is_empty());
        assert!(!h.controller.has_pending_advance());
    }

    #[tokio::test(start_paused = true)]
    async fn question_from_previous_round_is_dropped() {
        let mut h = Harness::new(ScriptedSupplier::default(), in_memory(), 10);
        h.controller.restart_round();
        h.settle().await.unwrap();
        h.drain_ui();
        h.controller.restart_round();
        h.drain_ui();

        h.controller
            .handle_event(QuizEvent::QuestionReady {
                generation: 0,
                question: Some(Question::new(Vec::new(), "old", true)),
            })
            .unwrap();
        assert!(shown_labels(&h.drain_ui()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn persistence_failure_propagates() {
        let mut h = Harness::new(ScriptedSupplier::default(), Box::new(BrokenStore), 1);
        h.controller.start();
        h.settle().await.unwrap();

        let err = h.answer_and_wait(true).await.unwrap_err();
        assert!(matches!(err, QuizError::Statistics(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_shutdown() {
        let supplier = Arc::new(ScriptedSupplier::default());
        let (sink, events) = EventSink::channel();
        let (ui, _rx) = UiHandle::channel();
        let mut controller = QuizController::new(
            supplier,
            Box::new(InMemoryStatisticsStore::new()),
            ui,
            sink.clone(),
            ControllerConfig::default(),
        );

        sink.send(QuizEvent::Shutdown);
        controller.run(events).await.unwrap();
        assert!(!controller.has_pending_advance());
    }

    #[test]
    fn summary_message_format() {
        let stats = Statistics {
            games_played: 3,
            best_game: Some(GameResult {
                id: Uuid::nil(),
                correct: 8,
                total: 10,
                date: Utc.with_ymd_and_hms(2026, 10, 19, 9, 5, 0).unwrap(),
            }),
            total_accuracy: 50.0,
        };
        assert_eq!(
            round_summary(7, 10, &stats),
            "Your result: 7/10\n\
             Number of quizzes played: 3\n\
             Your record: 8/10 19.10.26 09:05\n\
             Average accuracy: 50.00%"
        );
    }
}
