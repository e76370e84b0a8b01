use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::agent::{GitAgent, OperationResult};
use crate::config::GitAgentConfig;
use crate::external::ProcessCommandExecutor;
use crate::git::Git2Inspector;
use crate::oracle::{OracleBackend, StrategyGenerator};

pub mod config_info;
pub mod operation;
pub mod setup_provider;
pub mod smart_commit;
pub mod status;

pub use config_info::ConfigInfoCommand;
pub use operation::OperationCommand;
pub use setup_provider::SetupProviderCommand;
pub use smart_commit::SmartCommitCommand;
pub use status::StatusCommand;

/// Resolve a user-supplied repository path to an absolute directory.
pub fn resolve_repo_path(path: &Path) -> Result<PathBuf> {
    let resolved = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if !resolved.is_dir() {
        bail!("Not a directory: {}", resolved.display());
    }
    Ok(resolved)
}

/// Wire the production runner, inspector, and configured oracle into an agent.
pub fn build_agent(
    path: &Path,
    config: &GitAgentConfig,
    cancellation: CancellationToken,
) -> Result<GitAgent> {
    let repo_path = resolve_repo_path(path)?;
    let generator = OracleBackend::from_config(config);
    report_generator(&generator);

    Ok(GitAgent::new(
        repo_path,
        config.git_settings.clone(),
        Arc::new(ProcessCommandExecutor::new()),
        Arc::new(Git2Inspector::new()),
        Arc::new(generator),
    )
    .with_cancellation(cancellation))
}

fn report_generator(generator: &OracleBackend) {
    if generator.is_available() {
        println!("✅ Initialized {} provider ({})", generator.name(), generator.model());
    } else {
        println!("⚠️  No LLM providers available. Automatic recovery is disabled.");
    }
}

pub fn print_operation_result(result: &OperationResult) {
    println!();
    if result.success {
        println!("✅ SUCCESS");
        println!("──────────");
    } else {
        println!("❌ FAILED");
        println!("─────────");
    }
    println!("{}", result.message);

    if let Some(details) = &result.details {
        println!();
        println!("📋 Details:");
        for line in details.lines() {
            println!("   {line}");
        }
    }

    if let Some(branch) = &result.backup_branch {
        println!();
        println!("💾 Backup branch: {branch}");
    }
    println!("🕐 {}", result.timestamp.format("%Y-%m-%d %H:%M:%S"));
}
