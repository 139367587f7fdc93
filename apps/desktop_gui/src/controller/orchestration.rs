//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{BackendError, SessionController};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::reducer::apply_ui_event;

/// Queues `cmd` for the worker. A command that cannot be queued is settled at once
/// as a transport failure so the session never stays busy waiting for it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    session: &mut SessionController,
    worker_status: &mut String,
) {
    let cmd_name = cmd.name();

    let (failed, reason) = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            return;
        }
        Err(TrySendError::Full(cmd)) => (cmd, "UI command queue is full; please retry"),
        Err(TrySendError::Disconnected(cmd)) => (
            cmd,
            "Backend command processor disconnected (possible startup/runtime failure)",
        ),
    };

    tracing::warn!(command = cmd_name, reason, "failed to queue backend command");
    *worker_status = reason.to_string();
    let event = failed.into_failure(BackendError::Transport(reason.to_string()));
    apply_ui_event(session, worker_status, event);
}
