use anyhow::Result;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{build_agent, print_operation_result};
use crate::agent::{GitAgent, OperationKind, OperationResult};
use crate::config::GitAgentConfig;

/// `git-agent pull` / `git-agent push`
pub struct OperationCommand {
    pub kind: OperationKind,
    pub path: PathBuf,
    pub retry: bool,
}

impl OperationCommand {
    pub fn new(kind: OperationKind, path: PathBuf) -> Self {
        Self {
            kind,
            path,
            retry: false,
        }
    }

    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Returns whether the operation finally succeeded.
    pub async fn execute(
        &self,
        config: &GitAgentConfig,
        cancellation: CancellationToken,
    ) -> Result<bool> {
        let agent = build_agent(&self.path, config, cancellation.clone())?;

        let icon = match self.kind {
            OperationKind::Pull => "🔄",
            OperationKind::Push => "⬆️ ",
        };
        println!(
            "{} {} repository: {}",
            icon,
            match self.kind {
                OperationKind::Pull => "Pulling",
                OperationKind::Push => "Pushing",
            },
            agent.repo_path().display()
        );

        let attempts = if self.retry {
            agent.settings().max_retry_attempts.max(1)
        } else {
            1
        };
        let result = run_with_retry(&agent, self.kind, attempts, &cancellation).await;

        print_operation_result(&result);
        if agent.has_outstanding_stash() {
            println!("📦 Local changes are still stashed; run `git stash pop` to restore them");
        }
        Ok(result.success)
    }
}

/// Re-run the whole operation while it fails, at most `attempts` times.
pub async fn run_with_retry(
    agent: &GitAgent,
    kind: OperationKind,
    attempts: u32,
    cancellation: &CancellationToken,
) -> OperationResult {
    let mut attempt = 1;
    loop {
        let result = agent.run(kind).await;
        if result.success || attempt >= attempts || cancellation.is_cancelled() {
            return result;
        }

        info!(attempt, attempts, "{} failed, retrying: {}", kind.title(), result.message);
        println!("🔁 Attempt {attempt}/{attempts} failed: {}", result.message);
        attempt += 1;
    }
}
