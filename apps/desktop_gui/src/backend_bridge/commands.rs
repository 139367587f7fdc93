//! Backend commands queued from UI to backend worker.

use client_core::{BackendError, OperationTicket, SelectedFile};
use shared::protocol::{AskRequest, GenerateVideoRequest};

use crate::controller::events::UiEvent;

#[derive(Debug)]
pub enum BackendCommand {
    Probe {
        ticket: OperationTicket,
    },
    Ingest {
        ticket: OperationTicket,
        file: SelectedFile,
    },
    Generate {
        ticket: OperationTicket,
        request: GenerateVideoRequest,
    },
    Ask {
        ticket: OperationTicket,
        request: AskRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Probe { .. } => "probe",
            BackendCommand::Ingest { .. } => "ingest",
            BackendCommand::Generate { .. } => "generate_video",
            BackendCommand::Ask { .. } => "ask",
        }
    }

    pub fn ticket(&self) -> OperationTicket {
        match self {
            BackendCommand::Probe { ticket }
            | BackendCommand::Ingest { ticket, .. }
            | BackendCommand::Generate { ticket, .. }
            | BackendCommand::Ask { ticket, .. } => *ticket,
        }
    }

    /// Settlement event for a command that could not be executed.
    pub fn into_failure(self, err: BackendError) -> UiEvent {
        let ticket = self.ticket();
        match self {
            BackendCommand::Probe { .. } => UiEvent::ProbeSettled {
                ticket,
                outcome: Err(err),
            },
            BackendCommand::Ingest { .. } => UiEvent::UploadSettled {
                ticket,
                outcome: Err(err),
            },
            BackendCommand::Generate { .. } => UiEvent::GenerateSettled {
                ticket,
                outcome: Err(err),
            },
            BackendCommand::Ask { .. } => UiEvent::AskSettled {
                ticket,
                outcome: Err(err),
            },
        }
    }
}
