#![deny(missing_docs)]
//! Diagnostic logging shared by the transfer workspace.
//!
//! These macros feed the `log` facade and are meant for developer-facing
//! diagnostics. The user-facing hourly activity log lives in
//! `transfer_engine::LogStore` and is unrelated to this crate.

/// Logs a trace-level diagnostic.
#[macro_export]
macro_rules! transfer_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: "transfer", $($arg)*);
    }};
}

/// Logs a debug-level diagnostic.
#[macro_export]
macro_rules! transfer_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: "transfer", $($arg)*);
    }};
}

/// Logs an info-level diagnostic.
#[macro_export]
macro_rules! transfer_info {
    ($($arg:tt)*) => {{
        log::info!(target: "transfer", $($arg)*);
    }};
}

/// Logs a warn-level diagnostic.
#[macro_export]
macro_rules! transfer_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: "transfer", $($arg)*);
    }};
}

/// Logs an error-level diagnostic.
#[macro_export]
macro_rules! transfer_error {
    ($($arg:tt)*) => {{
        log::error!(target: "transfer", $($arg)*);
    }};
}

/// Installs a terminal logger for tests.
///
/// Safe to call from every test: if a logger is already installed the call
/// does nothing.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Never,
    )]);
}
