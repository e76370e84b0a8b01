use chrono::{DateTime, Local};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::external::CommandExecutor;

/// Namespace every safety branch is created under.
pub const BACKUP_BRANCH_PREFIX: &str = "backup/git_agent_";

/// Sortable timestamp embedded in backup branch names.
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutcome {
    pub branch_name: String,
    pub created: bool,
    pub output: String,
}

pub fn backup_branch_name(at: DateTime<Local>) -> String {
    format!(
        "{}{}",
        BACKUP_BRANCH_PREFIX,
        at.format(BACKUP_TIMESTAMP_FORMAT)
    )
}

/// Creates safety branches at HEAD before history-mutating operations.
///
/// Best effort: a failed backup is logged and reported, never raised.
#[derive(Clone)]
pub struct BackupManager {
    executor: Arc<dyn CommandExecutor>,
}

impl BackupManager {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Create `backup/git_agent_<timestamp>` at HEAD without checking it out.
    pub async fn create_backup(&self, working_dir: &Path) -> BackupOutcome {
        let branch_name = backup_branch_name(Local::now());
        let outcome = self
            .executor
            .run(working_dir, "git", &["branch", branch_name.as_str()])
            .await;

        if outcome.succeeded {
            info!("Created backup branch: {}", branch_name);
        } else {
            warn!("Failed to create backup {}: {}", branch_name, outcome.output);
        }

        BackupOutcome {
            branch_name,
            created: outcome.succeeded,
            output: outcome.output,
        }
    }
}
