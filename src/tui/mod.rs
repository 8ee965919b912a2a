//! Terminal User Interface module for workboard
//!
//! A keyboard-driven dashboard that polls the configured source and shows
//! the dashboard, item table, kanban board and activity feed as tabs.
//! While it runs, logs go to a file instead of stderr.

mod app;
mod views;

pub use app::{TuiOptions, run};

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Directory the TUI writes its log file to.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("workboard")
}

/// Route tracing output to a daily log file. Keep the guard alive for the
/// life of the TUI or buffered lines are lost.
pub fn init_file_logging(filter: EnvFilter) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(log_dir(), "tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();
    guard
}
