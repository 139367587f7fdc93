//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{HttpBackend, Settings, StudioBackend};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Starts the backend worker thread. Each command runs as its own task so a slow
/// generation never holds up a health probe.
pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::WorkerFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let backend: Arc<dyn StudioBackend> = match HttpBackend::new(&settings) {
            Ok(backend) => Arc::new(backend),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::WorkerFailed(format!(
                    "backend worker startup failure: {err:#}"
                )));
                tracing::error!("failed to build http backend: {err:#}");
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Backend worker ready ({})",
            settings.backend_url
        )));

        while let Ok(cmd) = cmd_rx.recv() {
            tracing::debug!(command = cmd.name(), seq = cmd.ticket().seq(), "running backend command");
            let backend = Arc::clone(&backend);
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                let event = execute(backend.as_ref(), cmd).await;
                if ui_tx.send(event).is_err() {
                    tracing::warn!("ui event queue closed; dropping backend result");
                }
            });
        }

        tracing::info!("ui command queue closed; backend worker exiting");
    });
}

/// Performs one command against the backend and wraps the outcome for the UI.
pub(crate) async fn execute(backend: &dyn StudioBackend, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::Probe { ticket } => UiEvent::ProbeSettled {
            ticket,
            outcome: backend.health().await,
        },
        BackendCommand::Ingest { ticket, file } => UiEvent::UploadSettled {
            ticket,
            outcome: backend.ingest(&file).await,
        },
        BackendCommand::Generate { ticket, request } => UiEvent::GenerateSettled {
            ticket,
            outcome: backend.generate_video(&request).await,
        },
        BackendCommand::Ask { ticket, request } => UiEvent::AskSettled {
            ticket,
            outcome: backend.ask(&request).await,
        },
    }
}
