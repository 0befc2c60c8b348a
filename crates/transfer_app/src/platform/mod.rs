//! Platform layer: owns the control thread, executes core effects against the
//! engine and the activity log, and hosts the console collaborator.
mod app;
mod config;
mod effects;
pub mod logging;
mod ticker;
mod ui;

pub use app::{check_once, open_log_store, poll_once, run_console, CycleSummary};
pub use config::AppConfig;
