//! Command line surface and the immutable runtime configuration built from it.

use std::{collections::BTreeSet, path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::error::ConfigError;

pub const DEFAULT_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_LIMIT: usize = 20;

/// Kubernetes resource flapping detector.
#[derive(Debug, Parser)]
#[command(
    name = "kflap",
    about = "Kubernetes resource flapping detector",
    long_about = "Monitor Kubernetes resources for excessive updates by tracking resourceVersion changes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display a live table of Kubernetes resources and their resourceVersion changes
    Resources(ResourcesArgs),
}

#[derive(Debug, Args)]
pub struct ResourcesArgs {
    /// Comma-delimited list of resource types to monitor (default: all)
    #[arg(short = 'r', long, default_value = "")]
    pub resources: String,

    /// Polling interval in seconds
    #[arg(short = 'i', long, default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// Comma-delimited list of namespaces to monitor (default: all)
    #[arg(short = 'n', long, default_value = "")]
    pub namespaces: String,

    /// Number of table rows to display
    #[arg(short = 'l', long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Kubeconfig context to use (default: current context or in-cluster config)
    #[arg(long)]
    pub context: Option<String>,

    /// Directory receiving kflap.log (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Runtime configuration. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Resource plural names or kinds to watch. Empty means all.
    pub resources: BTreeSet<String>,
    /// Namespaces to scan. Empty means every namespace in the cluster.
    pub namespaces: BTreeSet<String>,
    pub interval_secs: u64,
    pub limit: usize,
    pub context: Option<String>,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_args(args: ResourcesArgs) -> Result<Self, ConfigError> {
        if args.interval == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if args.limit == 0 {
            return Err(ConfigError::InvalidLimit);
        }

        Ok(Self {
            resources: split_list(&args.resources),
            namespaces: split_list(&args.namespaces),
            interval_secs: args.interval,
            limit: args.limit,
            context: args.context,
            log_dir: args.log_dir.unwrap_or_else(std::env::temp_dir),
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resources: BTreeSet::new(),
            namespaces: BTreeSet::new(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            limit: DEFAULT_LIMIT,
            context: None,
            log_dir: std::env::temp_dir(),
        }
    }
}

/// Splits a comma-delimited flag value, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> ResourcesArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Resources(args) => args,
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(parse(&["kflap", "resources"])).unwrap();
        assert!(config.resources.is_empty());
        assert!(config.namespaces.is_empty());
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.limit, 20);
        assert_eq!(config.context, None);
    }

    #[test]
    fn test_short_flags_and_lists() {
        let args = parse(&[
            "kflap",
            "resources",
            "-r",
            "pods, deployments,,",
            "-n",
            "default,kube-system",
            "-i",
            "2",
            "-l",
            "7",
        ]);
        let config = Config::from_args(args).unwrap();

        let resources: Vec<&str> = config.resources.iter().map(String::as_str).collect();
        assert_eq!(resources, vec!["deployments", "pods"]);
        let namespaces: Vec<&str> = config.namespaces.iter().map(String::as_str).collect();
        assert_eq!(namespaces, vec!["default", "kube-system"]);
        assert_eq!(config.interval(), Duration::from_secs(2));
        assert_eq!(config.limit, 7);
    }

    #[test]
    fn test_rejects_zero_values() {
        let err = Config::from_args(parse(&["kflap", "resources", "-i", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidInterval);

        let err = Config::from_args(parse(&["kflap", "resources", "-l", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLimit);
    }

    #[test]
    fn test_split_list_empty() {
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }
}
