//! Error types shared across the monitor.

use thiserror::Error;

/// Failures that prevent the monitor from starting at all.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("error loading kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("error inferring cluster config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("error creating client: {0}")]
    Client(#[source] kube::Error),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failures that abort a single poll cycle. The next tick retries.
///
/// Per-resource list failures and unparseable versions are not represented
/// here: they are skipped inside the cycle and never fail it.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("error discovering resources: {0}")]
    DiscoveryFailed(#[source] kube::Error),

    #[error("error listing namespaces: {0}")]
    NamespaceEnumerationFailed(#[source] kube::Error),

    #[error("poll task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("interval must be at least 1 second")]
    InvalidInterval,

    #[error("limit must be at least 1 row")]
    InvalidLimit,
}
