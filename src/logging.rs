/*
 * BFX-FIX GATEWAY - LOGGING
 * =================================================================
 * Component Name: src/logging.rs
 * Core Responsibility: initialize the non-blocking `tracing` pipeline
 * once in `main`. Deliberately no global logger handle is threaded
 * through the rest of the crate; every module reaches `tracing::info!`
 * etc directly and is identified by its module path, not by an
 * injected logger object.
 * =================================================================
 */

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global subscriber. The returned `WorkerGuard` must be
/// held for the lifetime of the process — dropping it flushes and stops
/// the background writer thread.
pub fn init_logger(log_dir: &str, level: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "bfx_fix_gateway.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_thread_ids(true)
        .with_target(true)
        .with_ansi(false)
        .compact();

    let console_layer = fmt::layer().with_target(true).compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry().with(filter).with(file_layer).with(console_layer).init();

    tracing::info!(log_dir, level, "logging initialized");
    guard
}
