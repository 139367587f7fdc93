//! UI layer for desktop GUI: app shell and status theming.

pub mod app;
pub mod theme;

pub use app::{DesktopGuiApp, StartupConfig};
