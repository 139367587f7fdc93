use client_core::StatusKind;
use eframe::egui;

/// Fill and outline for the status banner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BannerPalette {
    pub fill: egui::Color32,
    pub stroke: egui::Stroke,
    pub text: egui::Color32,
}

pub fn banner_palette(kind: StatusKind) -> BannerPalette {
    match kind {
        StatusKind::Success => BannerPalette {
            fill: egui::Color32::from_rgb(44, 94, 58),
            stroke: egui::Stroke::new(1.0, egui::Color32::from_rgb(92, 166, 112)),
            text: egui::Color32::WHITE,
        },
        StatusKind::Failure => BannerPalette {
            fill: egui::Color32::from_rgb(111, 53, 53),
            stroke: egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
            text: egui::Color32::WHITE,
        },
        StatusKind::Info => BannerPalette {
            fill: egui::Color32::from_rgb(42, 70, 110),
            stroke: egui::Stroke::new(1.0, egui::Color32::from_rgb(96, 136, 190)),
            text: egui::Color32::WHITE,
        },
    }
}
