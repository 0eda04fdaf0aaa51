use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use kflap::config::{Cli, Command, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Resources(args) => {
            let config = Config::from_args(args).context("invalid arguments")?;

            init_logging(&config)?;

            let result = kflap::run(config).await;
            kflap::shutdown_logging();
            result?;
        }
    }
    Ok(())
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    kflap::init_logging(config)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("failed to set up logging in {}", config.log_dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_failure_names_the_directory() {
        let config = Config {
            log_dir: std::env::temp_dir().join("kflap-missing-dir").join("nested"),
            ..Config::default()
        };

        let err = init_logging(&config).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("failed to set up logging in "));
        assert!(message.contains("kflap-missing-dir"));
    }
}
