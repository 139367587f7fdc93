mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::{load_settings, Settings};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{DesktopGuiApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "autodidact-gui", about = "Auto-Didact desktop client")]
struct Args {
    /// Overrides the backend url from autodidact.toml / environment.
    #[arg(long)]
    backend_url: Option<String>,
    /// Per-request timeout in seconds; 0 waits forever.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn apply_overrides(mut settings: Settings, args: &Args) -> Result<Settings> {
    if let Some(url) = &args.backend_url {
        settings.backend_url = url.clone();
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = secs;
    }
    settings.validate()?;
    Ok(settings)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let settings = apply_overrides(load_settings()?, &args)?;
    tracing::info!(backend_url = %settings.backend_url, "starting desktop client");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Auto-Didact")
            .with_inner_size([760.0, 720.0])
            .with_min_inner_size([520.0, 480.0]),
        ..Default::default()
    };
    let startup = StartupConfig { settings };
    eframe::run_native(
        "Auto-Didact",
        options,
        Box::new(move |_cc| Ok(Box::new(DesktopGuiApp::bootstrap(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow!("failed to run desktop window: {err}"))
}
