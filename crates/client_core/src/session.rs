//! Session controller: the single owner of one client session's state.
//!
//! Every primary operation (upload, generate, ask) is split into a `begin_*` half that checks
//! the guard, marks the session busy and hands back the request to issue, and a `settle_*` half
//! that applies the outcome. The halves are joined by an [`OperationTicket`], so the request
//! itself can run anywhere (another thread, another runtime) while the state stays here.
//! The async `upload_document`, `generate_video`, `ask_question` and `probe_backend` helpers
//! run both halves around a [`StudioBackend`] call.

use shared::protocol::{
    AskRequest, AskResponse, GenerateVideoRequest, GenerateVideoResponse, HealthResponse,
    IngestResponse,
};
use tracing::{debug, info, warn};

use crate::{
    error::{BackendError, GuardError, Rejected},
    settings::{Settings, StatusOrdering},
    types::{SelectedFile, StatusMessage},
    StudioBackend,
};

pub const UNREACHABLE_MESSAGE: &str = "Backend is unreachable!";
pub const MISSING_FILE_MESSAGE: &str = "Please select a PDF file first";
pub const EMPTY_CONTEXT_MESSAGE: &str = "Please enter some context text for video generation";
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question first";
pub const UPLOAD_IN_PROGRESS_MESSAGE: &str = "Uploading and processing PDF...";
pub const GENERATE_IN_PROGRESS_MESSAGE: &str = "Generating video script...";
pub const ASK_IN_PROGRESS_MESSAGE: &str = "Searching ingested documents...";
pub const GENERATE_SUCCESS_MESSAGE: &str = "Video generated successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Probe,
    Upload,
    Generate,
    Ask,
}

impl OperationKind {
    /// Primary operations are serialized by the busy flag; the probe is not.
    pub fn is_primary(self) -> bool {
        !matches!(self, OperationKind::Probe)
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Probe => "probe",
            OperationKind::Upload => "upload",
            OperationKind::Generate => "generate",
            OperationKind::Ask => "ask",
        }
    }

    fn generic_failure(self) -> &'static str {
        match self {
            OperationKind::Probe => UNREACHABLE_MESSAGE,
            OperationKind::Upload => "Upload failed",
            OperationKind::Generate => "Video generation failed",
            OperationKind::Ask => "Question failed",
        }
    }
}

/// Identifies one issued operation. Settling requires the ticket returned by `begin_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationTicket {
    seq: u64,
    kind: OperationKind,
}

impl OperationTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

/// Maps a failed remote call to the status shown for it.
pub fn failure_status(kind: OperationKind, err: &BackendError) -> StatusMessage {
    match (kind, err) {
        (OperationKind::Probe, _) => StatusMessage::failure(UNREACHABLE_MESSAGE),
        (_, BackendError::Rejected { detail, .. }) => StatusMessage::failure(
            detail
                .clone()
                .unwrap_or_else(|| kind.generic_failure().to_string()),
        ),
        (_, BackendError::Transport(_) | BackendError::Decode(_)) => {
            StatusMessage::failure(UNREACHABLE_MESSAGE)
        }
        (_, BackendError::LocalFile { name, reason }) => {
            StatusMessage::failure(format!("Could not read {name}: {reason}"))
        }
        (_, BackendError::InvalidUrl(message)) => StatusMessage::failure(message.clone()),
    }
}

#[derive(Debug)]
pub struct SessionController {
    selected_file: Option<SelectedFile>,
    context: String,
    question: String,
    status: Option<StatusMessage>,
    /// Sequence number of whatever produced the current status.
    status_seq: u64,
    status_revision: u64,
    in_flight: Option<OperationTicket>,
    video_path: Option<String>,
    answer: Option<AskResponse>,
    next_seq: u64,
    video_title: String,
    ordering: StatusOrdering,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl SessionController {
    pub fn new(settings: &Settings) -> Self {
        Self {
            selected_file: None,
            context: String::new(),
            question: String::new(),
            status: None,
            status_seq: 0,
            status_revision: 0,
            in_flight: None,
            video_path: None,
            answer: None,
            next_seq: 0,
            video_title: settings.video_title.clone(),
            ordering: settings.status_ordering,
        }
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Bumped on every status write, including clears.
    pub fn status_revision(&self) -> u64 {
        self.status_revision
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<OperationTicket> {
        self.in_flight
    }

    pub fn video_path(&self) -> Option<&str> {
        self.video_path.as_deref()
    }

    pub fn answer(&self) -> Option<&AskResponse> {
        self.answer.as_ref()
    }

    pub fn can_upload(&self) -> bool {
        self.selected_file.is_some() && !self.is_busy()
    }

    pub fn can_generate(&self) -> bool {
        !self.context.trim().is_empty() && !self.is_busy()
    }

    pub fn can_ask(&self) -> bool {
        !self.question.trim().is_empty() && !self.is_busy()
    }

    /// Mutable buffer for text widgets bound directly to the context.
    pub fn context_mut(&mut self) -> &mut String {
        &mut self.context
    }

    pub fn set_context(&mut self, text: impl Into<String>) {
        self.context = text.into();
    }

    pub fn question_mut(&mut self) -> &mut String {
        &mut self.question
    }

    pub fn set_question(&mut self, text: impl Into<String>) {
        self.question = text.into();
    }

    /// Replaces the selected document. A cancelled picker (`None`) changes nothing.
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        let Some(file) = file else {
            return;
        };
        debug!(name = file.name(), "document selected");
        self.selected_file = Some(file);
        self.video_path = None;
        self.answer = None;
        let seq = self.claim_seq();
        self.write_status(seq, None);
    }

    pub fn begin_upload(&mut self) -> Result<(OperationTicket, SelectedFile), Rejected> {
        self.ensure_idle(OperationKind::Upload)?;
        let Some(file) = self.selected_file.clone() else {
            return Err(self.reject_guard(GuardError::NoFileSelected, MISSING_FILE_MESSAGE));
        };

        let ticket = self.start_primary(OperationKind::Upload, UPLOAD_IN_PROGRESS_MESSAGE);
        info!(seq = ticket.seq, name = file.name(), "uploading document");
        Ok((ticket, file))
    }

    pub fn settle_upload(
        &mut self,
        ticket: OperationTicket,
        outcome: Result<IngestResponse, BackendError>,
    ) {
        if !self.finish_primary(ticket) {
            return;
        }
        let status = match outcome {
            Ok(receipt) => {
                info!(chunks = receipt.chunks_uploaded, "document ingested");
                StatusMessage::success(format!(
                    "Success! Uploaded {} chunks to vector database.",
                    receipt.chunks_uploaded
                ))
            }
            Err(err) => self.log_failure(ticket, &err),
        };
        self.write_settled(status);
    }

    pub fn begin_generate(&mut self) -> Result<(OperationTicket, GenerateVideoRequest), Rejected> {
        self.ensure_idle(OperationKind::Generate)?;
        if self.context.trim().is_empty() {
            return Err(self.reject_guard(GuardError::EmptyContext, EMPTY_CONTEXT_MESSAGE));
        }

        let ticket = self.start_primary(OperationKind::Generate, GENERATE_IN_PROGRESS_MESSAGE);
        info!(seq = ticket.seq, len = self.context.len(), "requesting video generation");
        let request = GenerateVideoRequest {
            context: self.context.clone(),
            title: self.video_title.clone(),
        };
        Ok((ticket, request))
    }

    pub fn settle_generate(
        &mut self,
        ticket: OperationTicket,
        outcome: Result<GenerateVideoResponse, BackendError>,
    ) {
        if !self.finish_primary(ticket) {
            return;
        }
        let status = match outcome {
            Ok(response) => {
                info!(video_path = %response.video_path, "video generated");
                self.video_path = Some(response.video_path);
                StatusMessage::success(GENERATE_SUCCESS_MESSAGE)
            }
            Err(err) => self.log_failure(ticket, &err),
        };
        self.write_settled(status);
    }

    pub fn begin_ask(&mut self) -> Result<(OperationTicket, AskRequest), Rejected> {
        self.ensure_idle(OperationKind::Ask)?;
        let question = self.question.trim().to_string();
        if question.is_empty() {
            return Err(self.reject_guard(GuardError::EmptyQuestion, EMPTY_QUESTION_MESSAGE));
        }

        let request = AskRequest { question };
        let ticket = self.start_primary(OperationKind::Ask, ASK_IN_PROGRESS_MESSAGE);
        info!(seq = ticket.seq, "asking question");
        Ok((ticket, request))
    }

    pub fn settle_ask(&mut self, ticket: OperationTicket, outcome: Result<AskResponse, BackendError>) {
        if !self.finish_primary(ticket) {
            return;
        }
        let status = match outcome {
            Ok(response) => {
                let status = StatusMessage::success(format!(
                    "Answer ready ({} sources).",
                    response.sources.len()
                ));
                self.answer = Some(response);
                status
            }
            Err(err) => self.log_failure(ticket, &err),
        };
        self.write_settled(status);
    }

    /// Issues a health probe. Never touches the busy flag.
    pub fn begin_probe(&mut self) -> OperationTicket {
        let ticket = OperationTicket {
            seq: self.claim_seq(),
            kind: OperationKind::Probe,
        };
        debug!(seq = ticket.seq, "probing backend");
        ticket
    }

    pub fn settle_probe(
        &mut self,
        ticket: OperationTicket,
        outcome: Result<HealthResponse, BackendError>,
    ) {
        if ticket.kind != OperationKind::Probe {
            debug!(?ticket, "ignoring probe outcome for non-probe ticket");
            return;
        }
        if self.ordering == StatusOrdering::Sequenced && ticket.seq <= self.status_seq {
            debug!(
                seq = ticket.seq,
                status_seq = self.status_seq,
                "dropping stale probe result"
            );
            return;
        }

        let status = match outcome {
            Ok(health) => StatusMessage::success(health.status),
            Err(err) => self.log_failure(ticket, &err),
        };
        self.write_status(ticket.seq, Some(status));
    }

    pub async fn upload_document(&mut self, backend: &dyn StudioBackend) -> Option<StatusMessage> {
        if let Ok((ticket, file)) = self.begin_upload() {
            let outcome = backend.ingest(&file).await;
            self.settle_upload(ticket, outcome);
        }
        self.status.clone()
    }

    pub async fn generate_video(&mut self, backend: &dyn StudioBackend) -> Option<StatusMessage> {
        if let Ok((ticket, request)) = self.begin_generate() {
            let outcome = backend.generate_video(&request).await;
            self.settle_generate(ticket, outcome);
        }
        self.status.clone()
    }

    pub async fn ask_question(&mut self, backend: &dyn StudioBackend) -> Option<StatusMessage> {
        if let Ok((ticket, request)) = self.begin_ask() {
            let outcome = backend.ask(&request).await;
            self.settle_ask(ticket, outcome);
        }
        self.status.clone()
    }

    pub async fn probe_backend(&mut self, backend: &dyn StudioBackend) -> Option<StatusMessage> {
        let ticket = self.begin_probe();
        let outcome = backend.health().await;
        self.settle_probe(ticket, outcome);
        self.status.clone()
    }

    fn claim_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn write_status(&mut self, seq: u64, status: Option<StatusMessage>) {
        self.status = status;
        self.status_seq = self.status_seq.max(seq);
        self.status_revision += 1;
    }

    fn write_settled(&mut self, status: StatusMessage) {
        let seq = self.claim_seq();
        self.write_status(seq, Some(status));
    }

    fn ensure_idle(&self, kind: OperationKind) -> Result<(), Rejected> {
        match self.in_flight {
            Some(current) => {
                debug!(requested = kind.label(), in_flight = ?current, "rejecting while busy");
                Err(Rejected::Busy)
            }
            None => Ok(()),
        }
    }

    fn reject_guard(&mut self, guard: GuardError, message: &str) -> Rejected {
        debug!(%guard, "operation guard failed");
        let seq = self.claim_seq();
        self.write_status(seq, Some(StatusMessage::info(message)));
        Rejected::Guard(guard)
    }

    fn start_primary(&mut self, kind: OperationKind, progress: &str) -> OperationTicket {
        let ticket = OperationTicket {
            seq: self.claim_seq(),
            kind,
        };
        self.in_flight = Some(ticket);
        if matches!(kind, OperationKind::Upload | OperationKind::Generate) {
            self.video_path = None;
        }
        self.answer = None;
        self.write_status(ticket.seq, Some(StatusMessage::info(progress)));
        ticket
    }

    fn finish_primary(&mut self, ticket: OperationTicket) -> bool {
        if self.in_flight != Some(ticket) {
            debug!(?ticket, in_flight = ?self.in_flight, "ignoring outcome for unknown ticket");
            return false;
        }
        self.in_flight = None;
        true
    }

    fn log_failure(&self, ticket: OperationTicket, err: &BackendError) -> StatusMessage {
        if err.is_transport() {
            warn!(operation = ticket.kind.label(), seq = ticket.seq, "backend unreachable: {err}");
        } else {
            warn!(operation = ticket.kind.label(), seq = ticket.seq, "operation failed: {err}");
        }
        failure_status(ticket.kind, err)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
