//! Collaborator traits for the quiz controller.
//!
//! Question suppliers are implemented by the `moviequiz-suppliers` crate; the
//! renderer and alert presenter are implemented by whatever front end hosts
//! the quiz (the terminal UI in `moviequiz-cli`).

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::controller::QuizEvent;
use crate::model::{Question, QuizStep};

// ---------------------------------------------------------------------------
// Question supplier
// ---------------------------------------------------------------------------

/// Source of quiz questions.
///
/// The controller calls these from spawned tasks and turns the results into
/// `QuizEvent`s, so implementations may block on network or disk freely.
#[async_trait]
pub trait QuestionSupplier: Send + Sync {
    /// Human-readable supplier name (e.g. "deck").
    fn name(&self) -> &str;

    /// Load whatever the supplier needs before it can hand out questions.
    async fn load_data(&self) -> anyhow::Result<()>;

    /// Produce the next question, or `None` if none is available right now.
    async fn next_question(&self) -> anyhow::Result<Option<Question>>;
}

// ---------------------------------------------------------------------------
// Rendering surface
// ---------------------------------------------------------------------------

/// The surface that draws questions and answer feedback.
///
/// Only ever called from the UI context task, one call at a time.
pub trait Renderer: Send {
    fn show_question(&mut self, step: &QuizStep);
    fn set_loading_visible(&mut self, visible: bool);
    fn set_answer_buttons_enabled(&mut self, enabled: bool);
    fn show_answer_highlight(&mut self, is_correct: bool);
    fn clear_highlight(&mut self);
}

/// Modal alert surface.
pub trait AlertPresenter: Send {
    /// Show `alert`. Calling [`AlertResponder::confirm`] delivers the alert's
    /// action back to the controller.
    fn show_alert(&mut self, alert: AlertModel, responder: AlertResponder);
}

/// What pressing an alert's button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    /// Start a new round after the summary.
    PlayAgain,
    /// Reload supplier data after a load failure.
    RetryLoad,
}

/// Content of a modal alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertModel {
    pub title: String,
    pub message: String,
    pub button_text: String,
    pub action: AlertAction,
}

/// One-shot handle that reports an alert's button press.
#[derive(Debug)]
pub struct AlertResponder {
    sink: EventSink,
    action: AlertAction,
}

impl AlertResponder {
    pub fn new(sink: EventSink, action: AlertAction) -> Self {
        Self { sink, action }
    }

    pub fn action(&self) -> AlertAction {
        self.action
    }

    /// Press the alert's button.
    pub fn confirm(self) {
        self.sink.send(QuizEvent::AlertConfirmed(self.action));
    }
}

// ---------------------------------------------------------------------------
// Event sink
// ---------------------------------------------------------------------------

/// Cloneable sender half of the controller's event queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<QuizEvent>,
}

/// Receiver half of the controller's event queue.
pub type EventStream = mpsc::UnboundedReceiver<QuizEvent>;

impl EventSink {
    /// Create a connected sink/stream pair.
    pub fn channel() -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue an event. Events sent after the controller has stopped are
    /// dropped.
    pub fn send(&self, event: QuizEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("controller stopped, dropping event");
        }
    }

    /// Returns `true` once the controller has stopped listening.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
