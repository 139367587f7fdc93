//! Events flowing from the backend worker back to the UI thread.

use client_core::{BackendError, OperationTicket};
use shared::protocol::{AskResponse, GenerateVideoResponse, HealthResponse, IngestResponse};

#[derive(Debug)]
pub enum UiEvent {
    /// Worker lifecycle notice; never replaces the session status.
    Info(String),
    WorkerFailed(String),
    ProbeSettled {
        ticket: OperationTicket,
        outcome: Result<HealthResponse, BackendError>,
    },
    UploadSettled {
        ticket: OperationTicket,
        outcome: Result<IngestResponse, BackendError>,
    },
    GenerateSettled {
        ticket: OperationTicket,
        outcome: Result<GenerateVideoResponse, BackendError>,
    },
    AskSettled {
        ticket: OperationTicket,
        outcome: Result<AskResponse, BackendError>,
    },
}

impl UiEvent {
    pub fn ticket(&self) -> Option<OperationTicket> {
        match self {
            UiEvent::Info(_) | UiEvent::WorkerFailed(_) => None,
            UiEvent::ProbeSettled { ticket, .. }
            | UiEvent::UploadSettled { ticket, .. }
            | UiEvent::GenerateSettled { ticket, .. }
            | UiEvent::AskSettled { ticket, .. } => Some(*ticket),
        }
    }
}
