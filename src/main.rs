use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use git_agent::agent::OperationKind;
use git_agent::cli::commands::{
    ConfigInfoCommand, OperationCommand, SetupProviderCommand, SmartCommitCommand, StatusCommand,
};
use git_agent::cli::{Cli, Commands};
use git_agent::config::GitAgentConfig;
use git_agent::shutdown::ShutdownCoordinator;
use git_agent::telemetry::{init_telemetry, TelemetryOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = GitAgentConfig::load_env_file();
    let config = GitAgentConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let options = TelemetryOptions::from_config(&config.logging, cli.verbose, cli.json_logs);
    if let Err(e) = init_telemetry(&options) {
        eprintln!("⚠️  Logging disabled: {e}");
    }

    match env_file {
        Ok(Some(path)) => info!("Loaded environment variables from {}", path.display()),
        Ok(None) => {}
        Err(e) => warn!("Failed to load .env file: {}", e),
    }
    if let Some(path) = config.config_path.as_deref().filter(|_| !config.loaded_from_file()) {
        warn!("Config file not found: {}. Using defaults.", path.display());
    }

    let success = tokio::runtime::Runtime::new()?.block_on(async {
        let shutdown = ShutdownCoordinator::new();
        shutdown.install_signal_handler();
        run_command(cli.command, config, &shutdown).await
    })?;

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_command(
    command: Commands,
    config: GitAgentConfig,
    shutdown: &ShutdownCoordinator,
) -> Result<bool> {
    match command {
        Commands::Pull { path, retry } => {
            OperationCommand::new(OperationKind::Pull, path)
                .with_retry(retry)
                .execute(&config, shutdown.token())
                .await
        }
        Commands::Push { path, retry } => {
            OperationCommand::new(OperationKind::Push, path)
                .with_retry(retry)
                .execute(&config, shutdown.token())
                .await
        }
        Commands::Status { path } => StatusCommand::new(path).execute().await.map(|_| true),
        Commands::ConfigInfo => ConfigInfoCommand.execute(&config).await.map(|_| true),
        Commands::SetupProvider { provider, api_key } => {
            SetupProviderCommand::new(provider, api_key)
                .execute(config)
                .await
                .map(|_| true)
        }
        Commands::SmartCommit { message, path, yes } => {
            SmartCommitCommand::new(message, path)
                .with_auto_accept(yes)
                .execute(&config, shutdown.token())
                .await
        }
    }
}
