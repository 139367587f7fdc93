use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, HttpBackend, SelectedFile, SessionController, Settings, StatusKind,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "autodidact", about = "Upload documents and generate videos from the terminal")]
struct Args {
    /// Overrides the backend url from autodidact.toml / environment.
    #[arg(long)]
    backend_url: Option<String>,
    /// Per-request timeout in seconds; 0 waits forever.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend answers.
    Health,
    /// Upload a document for ingestion.
    Ingest { path: PathBuf },
    /// Generate a video from context text.
    Generate {
        #[arg(required_unless_present = "context_file")]
        context: Option<String>,
        #[arg(long, conflicts_with = "context")]
        context_file: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Ask a question against ingested documents.
    Ask { question: String },
    /// Upload a document, then generate a video from the given context.
    Run {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        context: String,
    },
}

fn apply_overrides(mut settings: Settings, args: &Args) -> Result<Settings> {
    if let Some(url) = &args.backend_url {
        settings.backend_url = url.clone();
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = secs;
    }
    if let Command::Generate {
        title: Some(title), ..
    } = &args.command
    {
        settings.video_title = title.clone();
    }
    settings.validate()?;
    Ok(settings)
}

/// 0 on success, 1 on a backend failure, 2 when a guard stopped the request.
fn exit_status_for(kind: Option<StatusKind>) -> u8 {
    match kind {
        Some(StatusKind::Success) => 0,
        Some(StatusKind::Failure) => 1,
        Some(StatusKind::Info) | None => 2,
    }
}

fn report(session: &SessionController) -> ExitCode {
    let kind = session.status().map(|status| status.kind());
    match session.status() {
        Some(status) if status.kind() == StatusKind::Failure => eprintln!("{status}"),
        Some(status) => println!("{status}"),
        None => {}
    }
    if let Some(path) = session.video_path() {
        println!("Video saved to: {path}");
    }
    if let Some(answer) = session.answer() {
        println!("\n{}", answer.answer);
        for source in &answer.sources {
            println!("  - {source}");
        }
    }
    ExitCode::from(exit_status_for(kind))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = apply_overrides(load_settings()?, &args)?;
    tracing::info!(backend_url = %settings.backend_url, "using backend");
    let backend = HttpBackend::new(&settings)?;
    let mut session = SessionController::new(&settings);

    match args.command {
        Command::Health => {
            session.probe_backend(&backend).await;
        }
        Command::Ingest { path } => {
            session.select_file(Some(SelectedFile::from_path(path)));
            session.upload_document(&backend).await;
        }
        Command::Generate {
            context,
            context_file,
            ..
        } => {
            let context = match (context, context_file) {
                (Some(context), _) => context,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("failed to read context file '{}'", path.display()))?,
                (None, None) => String::new(),
            };
            session.set_context(context);
            session.generate_video(&backend).await;
        }
        Command::Ask { question } => {
            session.set_question(question);
            session.ask_question(&backend).await;
        }
        Command::Run { file, context } => {
            session.select_file(Some(SelectedFile::from_path(file)));
            let uploaded = session.upload_document(&backend).await;
            if uploaded.as_ref().map(|status| status.kind()) != Some(StatusKind::Success) {
                return Ok(report(&session));
            }
            println!("{}", uploaded.map(|s| s.to_string()).unwrap_or_default());
            session.set_context(context);
            session.generate_video(&backend).await;
        }
    }

    Ok(report(&session))
}
