//! Applies backend events to the session state owned by the UI thread.

use client_core::SessionController;

use crate::controller::events::UiEvent;

/// Folds one worker event into the session. Worker lifecycle notices land in
/// `worker_status`; operation outcomes go through the controller's settle rules.
pub fn apply_ui_event(session: &mut SessionController, worker_status: &mut String, event: UiEvent) {
    match event {
        UiEvent::Info(message) => {
            tracing::debug!(%message, "backend worker notice");
            *worker_status = message;
        }
        UiEvent::WorkerFailed(message) => {
            tracing::error!(%message, "backend worker failed");
            *worker_status = message;
        }
        UiEvent::ProbeSettled { ticket, outcome } => session.settle_probe(ticket, outcome),
        UiEvent::UploadSettled { ticket, outcome } => session.settle_upload(ticket, outcome),
        UiEvent::GenerateSettled { ticket, outcome } => session.settle_generate(ticket, outcome),
        UiEvent::AskSettled { ticket, outcome } => session.settle_ask(ticket, outcome),
    }
}
