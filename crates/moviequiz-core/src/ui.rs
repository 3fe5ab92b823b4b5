//! The serialized UI-update context.
//!
//! A single task owns the renderer and the alert presenter and applies
//! commands in the order they were posted. Everything that touches display
//! state goes through a [`UiHandle`], so completions from concurrent tasks
//! can never interleave their UI mutations.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::model::QuizStep;
use crate::traits::{AlertModel, AlertPresenter, AlertResponder, Renderer};

/// A render request posted to the UI context.
#[derive(Debug)]
pub enum UiCommand {
    ShowQuestion(QuizStep),
    SetLoadingVisible(bool),
    SetAnswerButtonsEnabled(bool),
    ShowAnswerHighlight(bool),
    ClearHighlight,
    ShowAlert(AlertModel, AlertResponder),
}

/// Non-owning handle to the UI context.
///
/// Once the context is gone every call is a silent no-op.
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiCommand>,
}

impl UiHandle {
    /// Create a handle together with the receiving end, for hosts that drain
    /// the commands themselves.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn post(&self, command: UiCommand) {
        if self.tx.send(command).is_err() {
            tracing::trace!("UI context closed, dropping render call");
        }
    }

    pub fn show_question(&self, step: QuizStep) {
        self.post(UiCommand::ShowQuestion(step));
    }

    pub fn set_loading_visible(&self, visible: bool) {
        self.post(UiCommand::SetLoadingVisible(visible));
    }

    pub fn set_answer_buttons_enabled(&self, enabled: bool) {
        self.post(UiCommand::SetAnswerButtonsEnabled(enabled));
    }

    pub fn show_answer_highlight(&self, is_correct: bool) {
        self.post(UiCommand::ShowAnswerHighlight(is_correct));
    }

    pub fn clear_highlight(&self) {
        self.post(UiCommand::ClearHighlight);
    }

    pub fn show_alert(&self, alert: AlertModel, responder: AlertResponder) {
        self.post(UiCommand::ShowAlert(alert, responder));
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Apply one command to the surfaces.
pub fn apply(
    command: UiCommand,
    renderer: &mut dyn Renderer,
    alerts: &mut dyn AlertPresenter,
) {
    match command {
        UiCommand::ShowQuestion(step) => renderer.show_question(&step),
        UiCommand::SetLoadingVisible(visible) => renderer.set_loading_visible(visible),
        UiCommand::SetAnswerButtonsEnabled(enabled) => {
            renderer.set_answer_buttons_enabled(enabled)
        }
        UiCommand::ShowAnswerHighlight(is_correct) => renderer.show_answer_highlight(is_correct),
        UiCommand::ClearHighlight => renderer.clear_highlight(),
        UiCommand::ShowAlert(alert, responder) => alerts.show_alert(alert, responder),
    }
}

/// Spawn the UI context task.
///
/// The task ends when every [`UiHandle`] has been dropped; dropping the
/// returned `JoinHandle` does not stop it, aborting does.
pub fn spawn_ui<R, A>(mut renderer: R, mut alerts: A) -> (UiHandle, JoinHandle<()>)
where
    R: Renderer + 'static,
    A: AlertPresenter + 'static,
{
    let (handle, mut rx) = UiHandle::channel();
    let task = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            apply(command, &mut renderer, &mut alerts);
        }
        tracing::debug!("UI context stopped");
    });
    (handle, task)
}
