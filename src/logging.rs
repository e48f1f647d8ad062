//! Log setup.
//!
//! The TUI owns the terminal while it runs, so in that mode everything goes
//! to a daily rolling file under the user's data directory. One-shot CLI
//! commands log to stderr instead.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_NAME: &str = "docchat.log";

pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("docchat").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize logging for TUI mode. Keep the returned guard alive until
/// shutdown so buffered lines are flushed.
pub fn init_tui() -> WorkerGuard {
    let log_dir = log_dir();

    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_filter(env_filter("info"));

    // No stdout layer: the terminal belongs to ratatui
    if let Err(e) = tracing_subscriber::registry().with(file_layer).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    tracing::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_NAME)
    );

    guard
}

/// Initialize logging for one-shot commands: warnings and up on stderr.
pub fn init_cli() {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(env_filter("warn"));

    if let Err(e) = tracing_subscriber::registry().with(stderr_layer).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
