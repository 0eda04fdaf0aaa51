use std::{error::Error, fs::File, path::Path, sync::OnceLock};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Sends all tracing output to `<log_dir>/kflap.log`. The terminal belongs to
/// the UI, so nothing is written to stdout or stderr.
pub fn setup_logger(log_dir: &Path, _endpoint: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let file = File::create(log_dir.join("kflap.log"))?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_line_number(true)
        .with_writer(non_blocking_writer)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        );

    LOG_GUARD.set(guard).ok();
    tracing_subscriber::registry().with(file_layer).try_init()?;

    Ok(())
}

/// Nothing to flush; mirrors the telemetry backend's `shutdown`.
pub fn shutdown() {}
