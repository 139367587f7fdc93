use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::types::{StatusKind, FAILURE_MARKER, SUCCESS_MARKER};

struct FakeBackend {
    health: Result<HealthResponse, BackendError>,
    ingest: Result<IngestResponse, BackendError>,
    generate: Result<GenerateVideoResponse, BackendError>,
    ask: Result<AskResponse, BackendError>,
    calls: Mutex<Vec<OperationKind>>,
    generate_requests: Mutex<Vec<GenerateVideoRequest>>,
}

impl FakeBackend {
    fn healthy() -> Self {
        Self {
            health: Ok(HealthResponse {
                status: "Backend is running!".to_string(),
                project: Some("Auto-Didact".to_string()),
            }),
            ingest: Ok(IngestResponse {
                chunks_uploaded: 7,
                status: Some("Success".to_string()),
            }),
            generate: Ok(GenerateVideoResponse {
                video_path: "/out/video1.mp4".to_string(),
                status: Some("success".to_string()),
            }),
            ask: Ok(AskResponse {
                answer: "Plants turn light into sugar.".to_string(),
                sources: vec!["Photosynthesis is...".to_string()],
            }),
            calls: Mutex::new(Vec::new()),
            generate_requests: Mutex::new(Vec::new()),
        }
    }

    fn unreachable() -> Self {
        let refused = || BackendError::Transport("connection refused".to_string());
        Self {
            health: Err(refused()),
            ingest: Err(refused()),
            generate: Err(refused()),
            ask: Err(refused()),
            ..Self::healthy()
        }
    }

    fn with_ingest(mut self, outcome: Result<IngestResponse, BackendError>) -> Self {
        self.ingest = outcome;
        self
    }

    fn with_generate(mut self, outcome: Result<GenerateVideoResponse, BackendError>) -> Self {
        self.generate = outcome;
        self
    }

    fn calls(&self) -> Vec<OperationKind> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, kind: OperationKind) {
        self.calls.lock().expect("calls lock").push(kind);
    }
}

#[async_trait]
impl StudioBackend for FakeBackend {
    async fn health(&self) -> Result<HealthResponse, BackendError> {
        self.record(OperationKind::Probe);
        self.health.clone()
    }

    async fn ingest(&self, _document: &SelectedFile) -> Result<IngestResponse, BackendError> {
        self.record(OperationKind::Upload);
        self.ingest.clone()
    }

    async fn generate_video(
        &self,
        request: &GenerateVideoRequest,
    ) -> Result<GenerateVideoResponse, BackendError> {
        self.record(OperationKind::Generate);
        self.generate_requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.generate.clone()
    }

    async fn ask(&self, _request: &AskRequest) -> Result<AskResponse, BackendError> {
        self.record(OperationKind::Ask);
        self.ask.clone()
    }
}

fn pdf(name: &str) -> SelectedFile {
    SelectedFile::from_bytes(name, b"%PDF-1.7 test".to_vec())
}

fn rejected(status: u16, detail: Option<&str>) -> BackendError {
    BackendError::Rejected {
        status,
        detail: detail.map(str::to_string),
    }
}

fn unreachable_status() -> StatusMessage {
    StatusMessage::failure(UNREACHABLE_MESSAGE)
}

#[test]
fn select_file_tracks_latest_choice_and_clears_stale_state() {
    let mut session = SessionController::default();
    session.set_context("cells");
    let (ticket, _) = session.begin_generate().expect("generate starts");
    session.settle_generate(
        ticket,
        Ok(GenerateVideoResponse {
            video_path: "/out/old.mp4".to_string(),
            status: None,
        }),
    );
    assert!(session.status().is_some());
    assert_eq!(session.video_path(), Some("/out/old.mp4"));

    for name in ["a.pdf", "b.pdf", "notes.pdf"] {
        session.select_file(Some(pdf(name)));
        assert_eq!(session.selected_file().map(SelectedFile::name), Some(name));
        assert_eq!(session.status(), None);
        assert_eq!(session.video_path(), None);
    }
}

#[test]
fn cancelled_picker_keeps_previous_selection_and_status() {
    let mut session = SessionController::default();
    session.select_file(Some(pdf("keep.pdf")));
    session.set_context("   ");
    let _ = session.begin_generate();
    let status_before = session.status().cloned();

    session.select_file(None);

    assert_eq!(
        session.selected_file().map(SelectedFile::name),
        Some("keep.pdf")
    );
    assert_eq!(session.status().cloned(), status_before);
}

#[tokio::test]
async fn upload_without_file_is_a_local_guard() {
    let backend = FakeBackend::healthy();
    let mut session = SessionController::default();

    let status = session.upload_document(&backend).await;

    assert_eq!(status, Some(StatusMessage::info(MISSING_FILE_MESSAGE)));
    assert!(backend.calls().is_empty());
    assert!(!session.is_busy());
    assert_eq!(
        session.begin_upload().expect_err("guard"),
        Rejected::Guard(GuardError::NoFileSelected)
    );
}

#[tokio::test]
async fn generate_with_blank_context_never_reaches_backend() {
    let backend = FakeBackend::healthy();
    let mut session = SessionController::default();

    for context in ["", " ", "\n\t  "] {
        session.set_context(context);
        let status = session.generate_video(&backend).await;
        assert_eq!(status, Some(StatusMessage::info(EMPTY_CONTEXT_MESSAGE)));
        assert!(!session.is_busy());
    }
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn ask_with_blank_question_never_reaches_backend() {
    let backend = FakeBackend::healthy();
    let mut session = SessionController::default();
    session.set_question("   ");

    let status = session.ask_question(&backend).await;

    assert_eq!(status, Some(StatusMessage::info(EMPTY_QUESTION_MESSAGE)));
    assert!(backend.calls().is_empty());
}

#[test]
fn busy_spans_exactly_from_begin_to_settlement() {
    let outcomes: Vec<Result<IngestResponse, BackendError>> = vec![
        Ok(IngestResponse {
            chunks_uploaded: 1,
            status: None,
        }),
        Err(rejected(422, Some("not a pdf"))),
        Err(BackendError::Transport("connection reset".to_string())),
    ];

    for outcome in outcomes {
        let mut session = SessionController::default();
        session.select_file(Some(pdf("doc.pdf")));
        assert!(!session.is_busy());

        let (ticket, _) = session.begin_upload().expect("upload starts");
        assert!(session.is_busy());
        assert!(!session.can_upload());
        assert!(!session.can_generate());
        assert_eq!(
            session.status(),
            Some(&StatusMessage::info(UPLOAD_IN_PROGRESS_MESSAGE))
        );

        session.settle_upload(ticket, outcome);
        assert!(!session.is_busy());
        assert!(session.can_upload());
    }
}

#[test]
fn second_primary_operation_is_rejected_while_busy() {
    let mut session = SessionController::default();
    session.select_file(Some(pdf("doc.pdf")));
    session.set_context("mitochondria");
    let (ticket, _) = session.begin_upload().expect("upload starts");
    let revision = session.status_revision();

    assert_eq!(session.begin_generate().expect_err("busy"), Rejected::Busy);
    assert_eq!(session.begin_upload().expect_err("busy"), Rejected::Busy);
    assert_eq!(session.status_revision(), revision);
    assert_eq!(session.in_flight(), Some(ticket));
}

#[tokio::test]
async fn successful_ingest_reports_chunk_count() {
    let backend = FakeBackend::healthy();
    let mut session = SessionController::default();
    session.select_file(Some(pdf("doc.pdf")));

    let status = session.upload_document(&backend).await.expect("status");

    assert_eq!(status.kind(), StatusKind::Success);
    assert!(status.to_string().starts_with(SUCCESS_MARKER));
    assert!(status.text().contains('7'), "{status}");
    assert_eq!(backend.calls(), vec![OperationKind::Upload]);
}

#[tokio::test]
async fn successful_generate_sets_artifact_path() {
    let backend = FakeBackend::healthy();
    let mut session = SessionController::default();
    session.set_context("Photosynthesis converts light.");

    let status = session.generate_video(&backend).await.expect("status");

    assert_eq!(status, StatusMessage::success(GENERATE_SUCCESS_MESSAGE));
    assert!(status.to_string().starts_with(SUCCESS_MARKER));
    assert_eq!(session.video_path(), Some("/out/video1.mp4"));
    assert!(!session.is_busy());
}

#[tokio::test]
async fn generate_sends_raw_context_and_configured_title() {
    let backend = FakeBackend::healthy();
    let settings = Settings {
        video_title: "Biology 101".to_string(),
        ..Settings::default()
    };
    let mut session = SessionController::new(&settings);
    session.set_context("  spaced context \n");

    session.generate_video(&backend).await;

    let requests = backend.generate_requests.lock().expect("requests").clone();
    assert_eq!(
        requests,
        vec![GenerateVideoRequest {
            context: "  spaced context \n".to_string(),
            title: "Biology 101".to_string(),
        }]
    );
}

#[tokio::test]
async fn generate_failure_shows_server_detail_and_leaves_artifact_unset() {
    let backend =
        FakeBackend::healthy().with_generate(Err(rejected(400, Some("context too short"))));
    let mut session = SessionController::default();
    session.set_context("hi");

    let status = session.generate_video(&backend).await.expect("status");

    assert_eq!(status.kind(), StatusKind::Failure);
    assert!(status.to_string().starts_with(FAILURE_MARKER));
    assert!(status.text().contains("context too short"));
    assert_eq!(session.video_path(), None);
}

#[tokio::test]
async fn generate_clears_previous_artifact_when_it_starts() {
    let backend = FakeBackend::healthy();
    let mut session = SessionController::default();
    session.set_context("first");
    session.generate_video(&backend).await;
    assert!(session.video_path().is_some());

    let (ticket, _) = session.begin_generate().expect("second generate");
    assert_eq!(session.video_path(), None);
    session.settle_generate(ticket, Err(rejected(500, None)));
    assert_eq!(session.video_path(), None);
}

#[tokio::test]
async fn missing_detail_falls_back_to_generic_failure_text() {
    let backend = FakeBackend::healthy()
        .with_ingest(Err(rejected(500, None)))
        .with_generate(Err(rejected(500, None)));
    let mut session = SessionController::default();
    session.select_file(Some(pdf("doc.pdf")));
    session.set_context("text");

    assert_eq!(
        session.upload_document(&backend).await,
        Some(StatusMessage::failure("Upload failed"))
    );
    assert_eq!(
        session.generate_video(&backend).await,
        Some(StatusMessage::failure("Video generation failed"))
    );
}

#[tokio::test]
async fn transport_failure_shows_one_fixed_message_for_every_operation() {
    let backend = FakeBackend::unreachable();
    let mut session = SessionController::default();
    session.select_file(Some(pdf("doc.pdf")));
    session.set_context("text");
    session.set_question("why?");

    assert_eq!(
        session.upload_document(&backend).await,
        Some(unreachable_status())
    );
    assert_eq!(
        session.generate_video(&backend).await,
        Some(unreachable_status())
    );
    assert_eq!(session.ask_question(&backend).await, Some(unreachable_status()));
    assert_eq!(session.probe_backend(&backend).await, Some(unreachable_status()));
    assert!(!session.is_busy());
}

#[test]
fn malformed_success_body_is_reported_as_unreachable() {
    let mut session = SessionController::default();
    session.select_file(Some(pdf("doc.pdf")));
    let (ticket, _) = session.begin_upload().expect("upload starts");

    session.settle_upload(
        ticket,
        Err(BackendError::Decode("missing field `chunks_uploaded`".to_string())),
    );

    assert_eq!(session.status(), Some(&unreachable_status()));
}

#[test]
fn unreadable_local_file_names_the_document() {
    let mut session = SessionController::default();
    session.select_file(Some(SelectedFile::from_path("/nowhere/ghost.pdf")));
    let (ticket, _) = session.begin_upload().expect("upload starts");

    session.settle_upload(
        ticket,
        Err(BackendError::LocalFile {
            name: "ghost.pdf".to_string(),
            reason: "No such file or directory".to_string(),
        }),
    );

    let status = session.status().expect("status");
    assert_eq!(status.kind(), StatusKind::Failure);
    assert!(status.text().starts_with("Could not read ghost.pdf"));
}

#[tokio::test]
async fn repeated_probes_classify_consistently() {
    let healthy = FakeBackend::healthy();
    let down = FakeBackend::unreachable();
    let mut session = SessionController::default();

    for _ in 0..3 {
        let status = session.probe_backend(&healthy).await.expect("status");
        assert_eq!(status, StatusMessage::success("Backend is running!"));
    }
    for _ in 0..3 {
        let status = session.probe_backend(&down).await.expect("status");
        assert_eq!(status.kind(), StatusKind::Failure);
    }
}

#[test]
fn probe_ignores_busy_flag() {
    let mut session = SessionController::default();
    session.select_file(Some(pdf("doc.pdf")));
    let (upload, _) = session.begin_upload().expect("upload starts");

    let probe = session.begin_probe();
    assert_eq!(session.in_flight(), Some(upload));
    session.settle_probe(
        probe,
        Ok(HealthResponse {
            status: "ok".to_string(),
            project: None,
        }),
    );
    assert_eq!(session.status(), Some(&StatusMessage::success("ok")));
    assert!(session.is_busy());

    session.settle_upload(
        upload,
        Ok(IngestResponse {
            chunks_uploaded: 3,
            status: None,
        }),
    );
    assert!(!session.is_busy());
    assert!(session.status().expect("status").text().contains('3'));
}

#[test]
fn stale_probe_result_does_not_clobber_newer_status() {
    let mut session = SessionController::default();
    session.select_file(Some(pdf("doc.pdf")));

    let probe = session.begin_probe();
    let (_upload, _) = session.begin_upload().expect("upload starts");
    session.settle_probe(probe, Err(BackendError::Transport("slow".to_string())));

    assert_eq!(
        session.status(),
        Some(&StatusMessage::info(UPLOAD_IN_PROGRESS_MESSAGE))
    );
}

#[test]
fn last_response_wins_ordering_lets_stale_probe_clobber() {
    let settings = Settings {
        status_ordering: StatusOrdering::LastResponseWins,
        ..Settings::default()
    };
    let mut session = SessionController::new(&settings);
    session.select_file(Some(pdf("doc.pdf")));

    let probe = session.begin_probe();
    let (_upload, _) = session.begin_upload().expect("upload starts");
    session.settle_probe(probe, Err(BackendError::Transport("slow".to_string())));

    assert_eq!(session.status(), Some(&unreachable_status()));
    assert!(session.is_busy());
}

#[test]
fn older_of_two_probes_is_dropped_when_it_lands_last() {
    let mut session = SessionController::default();
    let first = session.begin_probe();
    let second = session.begin_probe();

    session.settle_probe(
        second,
        Ok(HealthResponse {
            status: "second".to_string(),
            project: None,
        }),
    );
    session.settle_probe(
        first,
        Ok(HealthResponse {
            status: "first".to_string(),
            project: None,
        }),
    );

    assert_eq!(session.status(), Some(&StatusMessage::success("second")));
}

#[test]
fn settling_with_foreign_ticket_changes_nothing() {
    let mut session = SessionController::default();
    session.select_file(Some(pdf("doc.pdf")));
    let (ticket, _) = session.begin_upload().expect("upload starts");
    let probe = session.begin_probe();
    let revision = session.status_revision();

    session.settle_upload(
        probe,
        Ok(IngestResponse {
            chunks_uploaded: 99,
            status: None,
        }),
    );

    assert_eq!(session.in_flight(), Some(ticket));
    assert_eq!(session.status_revision(), revision);

    session.settle_upload(ticket, Err(rejected(413, Some("file too large"))));
    let revision = session.status_revision();
    session.settle_upload(ticket, Err(rejected(500, None)));
    assert_eq!(session.status_revision(), revision);
    assert_eq!(
        session.status(),
        Some(&StatusMessage::failure("file too large"))
    );
}

#[tokio::test]
async fn ask_stores_answer_until_next_primary_operation() {
    let backend = FakeBackend::healthy();
    let mut session = SessionController::default();
    session.set_question("  What is photosynthesis?  ");

    let status = session.ask_question(&backend).await.expect("status");
    assert_eq!(status, StatusMessage::success("Answer ready (1 sources)."));
    assert_eq!(
        session.answer().map(|a| a.answer.as_str()),
        Some("Plants turn light into sugar.")
    );

    session.select_file(Some(pdf("doc.pdf")));
    assert!(session.answer().is_none());
}

#[tokio::test]
async fn end_to_end_upload_of_notes() {
    let backend = FakeBackend::healthy().with_ingest(Ok(IngestResponse {
        chunks_uploaded: 42,
        status: Some("Success".to_string()),
    }));
    let mut session = SessionController::default();

    session.select_file(Some(pdf("notes.pdf")));
    session.upload_document(&backend).await;

    let status = session.status().expect("status");
    assert_eq!(status.kind(), StatusKind::Success);
    assert!(status.text().contains("42"));
    assert!(!session.is_busy());
    assert_eq!(session.video_path(), None);
}

#[test]
fn status_display_carries_markers() {
    assert_eq!(StatusMessage::success("ok").to_string(), "✓ ok");
    assert_eq!(
        StatusMessage::failure(UNREACHABLE_MESSAGE).to_string(),
        "✗ Error: Backend is unreachable!"
    );
    assert_eq!(
        StatusMessage::info(UPLOAD_IN_PROGRESS_MESSAGE).to_string(),
        UPLOAD_IN_PROGRESS_MESSAGE
    );
}

#[test]
fn action_availability_follows_inputs() {
    let mut session = SessionController::default();
    assert!(!session.can_upload());
    assert!(!session.can_generate());
    assert!(!session.can_ask());

    session.select_file(Some(pdf("doc.pdf")));
    session.context_mut().push_str("  ");
    assert!(session.can_upload());
    assert!(!session.can_generate());

    session.context_mut().push_str("ribosomes");
    session.question_mut().push_str("why?");
    assert!(session.can_generate());
    assert!(session.can_ask());
}
