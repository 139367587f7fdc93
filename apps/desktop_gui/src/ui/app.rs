use std::path::PathBuf;

use arboard::Clipboard;
use chrono::{DateTime, Local};
use client_core::{OperationKind, SelectedFile, SessionController, Settings};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::apply_ui_event;
use crate::ui::theme::banner_palette;

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub settings: Settings,
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: SessionController,
    backend_url: String,
    worker_status: String,
    status_changed_at: Option<DateTime<Local>>,
    seen_status_revision: u64,
    clipboard_note: Option<String>,
}

fn default_upload_dir() -> Option<PathBuf> {
    dirs::desktop_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::document_dir)
        .or_else(dirs::home_dir)
}

fn pick_document() -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Choose a PDF to ingest")
        .add_filter("PDF documents", &["pdf"])
        .add_filter("All files", &["*"]);
    if let Some(dir) = default_upload_dir() {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

impl DesktopGuiApp {
    pub fn bootstrap(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            session: SessionController::new(&startup.settings),
            backend_url: startup.settings.backend_url,
            worker_status: String::new(),
            status_changed_at: None,
            seen_status_revision: 0,
            clipboard_note: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(&mut self.session, &mut self.worker_status, event);
        }
        self.note_status_change();
    }

    fn note_status_change(&mut self) {
        let revision = self.session.status_revision();
        if revision != self.seen_status_revision {
            self.seen_status_revision = revision;
            self.status_changed_at = self.session.status().map(|_| Local::now());
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(
            &self.cmd_tx,
            cmd,
            &mut self.session,
            &mut self.worker_status,
        );
    }

    fn test_connection(&mut self) {
        let ticket = self.session.begin_probe();
        self.dispatch(BackendCommand::Probe { ticket });
    }

    fn upload(&mut self) {
        if let Ok((ticket, file)) = self.session.begin_upload() {
            self.dispatch(BackendCommand::Ingest { ticket, file });
        }
    }

    fn generate(&mut self) {
        if let Ok((ticket, request)) = self.session.begin_generate() {
            self.dispatch(BackendCommand::Generate { ticket, request });
        }
    }

    fn ask(&mut self) {
        if let Ok((ticket, request)) = self.session.begin_ask() {
            self.dispatch(BackendCommand::Ask { ticket, request });
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        let result = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string()));
        self.clipboard_note = Some(match result {
            Ok(()) => "Copied to clipboard".to_string(),
            Err(err) => {
                tracing::warn!("clipboard unavailable: {err}");
                format!("Clipboard unavailable: {err}")
            }
        });
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Auto-Didact");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Test Backend Connection").clicked() {
                    self.test_connection();
                }
                ui.label(
                    egui::RichText::new(&self.backend_url)
                        .monospace()
                        .weak(),
                );
            });
        });
        ui.label("Upload study material, then turn your notes into a narrated video.");
    }

    fn show_status_banner(&self, ui: &mut egui::Ui) {
        let Some(status) = self.session.status() else {
            return;
        };
        let palette = banner_palette(status.kind());
        let stamp = self
            .status_changed_at
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_default();

        egui::Frame::NONE
            .fill(palette.fill)
            .stroke(palette.stroke)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    if self.session.is_busy() {
                        ui.spinner();
                    }
                    ui.label(egui::RichText::new(status.to_string()).color(palette.text));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(stamp).small().color(palette.text));
                    });
                });
            });
    }

    fn show_upload_step(&mut self, ui: &mut egui::Ui) {
        ui.heading("Step 1: Upload a PDF");
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.session.is_busy(), egui::Button::new("Choose file..."))
                .clicked()
            {
                if let Some(path) = pick_document() {
                    self.session.select_file(Some(SelectedFile::from_path(path)));
                }
            }
            match self.session.selected_file() {
                Some(file) => ui.label(format!("Selected: {}", file.name())),
                None => ui.weak("No file selected"),
            };
        });

        let uploading = self
            .session
            .in_flight()
            .is_some_and(|ticket| ticket.kind() == OperationKind::Upload);
        let label = if uploading { "Processing..." } else { "Upload & Ingest" };
        if ui
            .add_enabled(self.session.can_upload(), egui::Button::new(label))
            .clicked()
        {
            self.upload();
        }
    }

    fn show_generate_step(&mut self, ui: &mut egui::Ui) {
        ui.heading("Step 2: Generate a video");
        ui.add(
            egui::TextEdit::multiline(self.session.context_mut())
                .hint_text("Paste or type the context the video should explain...")
                .desired_rows(6)
                .desired_width(f32::INFINITY),
        );

        let generating = self
            .session
            .in_flight()
            .is_some_and(|ticket| ticket.kind() == OperationKind::Generate);
        let label = if generating { "Generating..." } else { "Generate Video" };
        if ui
            .add_enabled(self.session.can_generate(), egui::Button::new(label))
            .clicked()
        {
            self.generate();
        }

        if let Some(path) = self.session.video_path().map(str::to_string) {
            ui.horizontal_wrapped(|ui| {
                ui.label("Video saved to:");
                ui.label(egui::RichText::new(&path).monospace());
                if ui.small_button("Copy").clicked() {
                    self.copy_to_clipboard(&path);
                }
            });
        }
    }

    fn show_ask_step(&mut self, ui: &mut egui::Ui) {
        ui.heading("Ask your documents");
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 80.0).max(120.0);
            let response = ui.add(
                egui::TextEdit::singleline(self.session.question_mut())
                    .hint_text("What would you like to know?")
                    .desired_width(width),
            );
            let submitted =
                response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            let clicked = ui
                .add_enabled(self.session.can_ask(), egui::Button::new("Ask"))
                .clicked();
            if clicked || (submitted && self.session.can_ask()) {
                self.ask();
            }
        });

        if let Some(answer) = self.session.answer() {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.label(answer.answer.as_str());
                if !answer.sources.is_empty() {
                    ui.separator();
                    for source in &answer.sources {
                        ui.weak(format!("- {source}"));
                    }
                }
            });
        }
    }

    fn show_footer(&self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if !self.worker_status.is_empty() {
                ui.weak(self.worker_status.as_str());
            }
            if let Some(note) = &self.clipboard_note {
                ui.weak(note.as_str());
            }
        });
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("worker_status").show(ctx, |ui| self.show_footer(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.show_header(ui);
                ui.add_space(8.0);
                self.show_status_banner(ui);
                ui.add_space(12.0);
                self.show_upload_step(ui);
                ui.separator();
                self.show_generate_step(ui);
                ui.separator();
                self.show_ask_step(ui);
            });
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
