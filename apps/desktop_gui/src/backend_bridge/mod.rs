//! Backend bridge: commands queued by the UI and the worker thread that executes them.

pub mod commands;
pub mod runtime;
