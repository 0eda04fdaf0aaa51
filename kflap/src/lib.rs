//! kflap watches a Kubernetes cluster for objects whose `resourceVersion`
//! keeps moving and ranks them live in the terminal.

use std::{backtrace::Backtrace, error::Error, panic, sync::Arc};

use tracing::error;

use crate::{
    cluster::KubeCluster, config::Config, discovery::DeprecationPolicy, error::StartupError,
    monitor::Monitor,
};

cfg_if::cfg_if! {
    if #[cfg(feature = "telemetry")] {
        use kflap_telemetry as logging;
    } else {
        mod log;
        use log as logging;
    }
}

pub mod cluster;
pub mod config;
pub mod discovery;
pub mod error;
pub mod monitor;
pub mod scheduler;
pub mod sort;
pub mod ui;

const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Installs the tracing subscriber and the panic hook.
pub fn init_logging(config: &Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let endpoint =
        std::env::var(OTLP_ENDPOINT_VAR).unwrap_or_else(|_| DEFAULT_OTLP_ENDPOINT.to_string());
    logging::setup_logger(&config.log_dir, &endpoint)?;
    setup_panic_hook();
    Ok(())
}

pub fn shutdown_logging() {
    logging::shutdown();
}

fn setup_panic_hook() {
    let default = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        ui::session::reset_terminal();
        let bt = Backtrace::force_capture();
        error!(target: "panic", "panic: {panic_info}\n\nBacktrace:\n{bt}");
        default(panic_info);
    }));
}

/// Connects to the cluster and runs the monitor UI until the user quits.
pub async fn run(config: Config) -> Result<(), StartupError> {
    let cluster = KubeCluster::connect(config.context.clone()).await?;
    tracing::info!(
        resources = ?config.resources,
        namespaces = ?config.namespaces,
        interval_secs = config.interval_secs,
        limit = config.limit,
        "starting monitor"
    );

    let config = Arc::new(config);
    let monitor = Monitor::new(cluster, config.clone(), DeprecationPolicy::default());
    ui::run(monitor, &config).await
}
