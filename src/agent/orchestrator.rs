use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

use super::guard::{StepDecision, StepGuard, VCS_PROGRAM};
use super::types::{render_trail, ExecutedStep, OperationKind, OperationResult, StepStatus};
use crate::config::GitSettings;
use crate::external::CommandExecutor;
use crate::git::{BackupManager, RepositoryInspector, RepositoryStatus};
use crate::oracle::gateway::Consultation;
use crate::oracle::{build_commit_message_prompt, RecoveryOracleGateway, RecoveryPlan, StrategyGenerator};
use crate::telemetry::{create_operation_span, generate_correlation_id};

pub const AUTO_STASH_MESSAGE: &str = "git-agent auto-stash";
pub const OPERATION_CANCELLED: &str = "operation cancelled";
const NOTHING_TO_STASH: &str = "No local changes to save";

/// Runs pull/push against one repository and recovers failures through the oracle.
///
/// One invocation is one sequential pass; callers must not run two operations
/// against the same working directory at once. An auto-stash left behind by a
/// failed pull stays outstanding on the agent and is restored by the next pull
/// that succeeds.
pub struct GitAgent {
    repo_path: PathBuf,
    settings: GitSettings,
    executor: Arc<dyn CommandExecutor>,
    inspector: Arc<dyn RepositoryInspector>,
    gateway: RecoveryOracleGateway,
    backups: BackupManager,
    cancellation: CancellationToken,
    stash_outstanding: AtomicBool,
}

impl GitAgent {
    pub fn new(
        repo_path: impl Into<PathBuf>,
        settings: GitSettings,
        executor: Arc<dyn CommandExecutor>,
        inspector: Arc<dyn RepositoryInspector>,
        generator: Arc<dyn StrategyGenerator>,
    ) -> Self {
        Self {
            repo_path: repo_path.into(),
            settings,
            backups: BackupManager::new(executor.clone()),
            executor,
            inspector,
            gateway: RecoveryOracleGateway::new(generator),
            cancellation: CancellationToken::new(),
            stash_outstanding: AtomicBool::new(false),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn settings(&self) -> &GitSettings {
        &self.settings
    }

    /// True while our auto-stash from an earlier failed pull has not been popped.
    pub fn has_outstanding_stash(&self) -> bool {
        self.stash_outstanding.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> RepositoryStatus {
        self.inspector.status(&self.repo_path)
    }

    pub async fn pull(&self) -> OperationResult {
        self.run(OperationKind::Pull).await
    }

    pub async fn push(&self) -> OperationResult {
        self.run(OperationKind::Push).await
    }

    /// Attempt the operation once, then fall back to a single guarded recovery pass.
    pub async fn run(&self, kind: OperationKind) -> OperationResult {
        let correlation_id = generate_correlation_id();
        let span = create_operation_span(
            kind.as_str(),
            &self.repo_path.display().to_string(),
            &correlation_id,
        );

        self.run_once(kind).instrument(span).await
    }

    async fn run_once(&self, kind: OperationKind) -> OperationResult {
        if self.is_cancelled() {
            return cancelled(Vec::new());
        }

        let backup_branch = if self.settings.backup_before_operations {
            let outcome = self.backups.create_backup(&self.repo_path).await;
            outcome.created.then_some(outcome.branch_name)
        } else {
            None
        };

        let mut stashed = false;
        if kind == OperationKind::Pull {
            if self.has_outstanding_stash() {
                debug!("Reusing auto-stash from an earlier attempt");
                stashed = true;
            } else {
                let status = self.inspector.status(&self.repo_path);
                if !status.is_clean && self.settings.auto_stash {
                    if self.is_cancelled() {
                        return cancelled(Vec::new()).with_backup(backup_branch);
                    }
                    stashed = self.stash_changes().await;
                    self.stash_outstanding.store(stashed, Ordering::SeqCst);
                }
            }
        }

        if self.is_cancelled() {
            return cancelled(Vec::new()).with_backup(backup_branch);
        }

        info!("Attempting git {}", kind);
        let attempt = self
            .executor
            .run(&self.repo_path, VCS_PROGRAM, kind.git_args())
            .await;

        let result = if attempt.succeeded {
            info!("{} completed successfully", kind.title());
            if stashed {
                self.restore_stash().await;
            }
            OperationResult::succeeded(
                format!("{} completed successfully", kind.title()),
                Some(attempt.output),
            )
        } else {
            warn!("{} failed: {}", kind.title(), attempt.output);
            self.recover(kind, &attempt.output, stashed).await
        };

        result.with_backup(backup_branch)
    }

    async fn recover(&self, kind: OperationKind, failure: &str, stashed: bool) -> OperationResult {
        if self.is_cancelled() {
            return cancelled(Vec::new());
        }

        let status = self.inspector.status(&self.repo_path);
        debug!(?status, "Post-failure repository status");

        let no_recovery = format!("{} failed: no recovery available", kind.title());
        let plan = match self.gateway.consult(kind, &status, failure).await {
            Consultation::Plan(plan) => plan,
            Consultation::Unparseable { raw, error } => {
                return OperationResult::failed(
                    no_recovery,
                    Some(format!(
                        "{failure}\n\nFailed to parse recovery response ({error}):\n{raw}"
                    )),
                );
            }
            Consultation::Unavailable | Consultation::NoResponse(_) => {
                return OperationResult::failed(no_recovery, Some(failure.to_string()));
            }
        };

        if !plan.safe_to_proceed {
            warn!(risk = %plan.risk_level, "Recovery plan marked unsafe, not executing");
            return OperationResult::failed(
                format!(
                    "Recovery plan rejected as unsafe (risk level: {})",
                    plan.risk_level
                ),
                Some(plan.strategy_description),
            );
        }

        if plan.steps.is_empty() {
            warn!("Recovery plan has no steps");
            return OperationResult::failed(
                "Recovery plan rejected: no steps provided",
                Some(plan.strategy_description),
            );
        }

        if plan.requires_force && !self.settings.force_push_allowed {
            info!("Plan requests force but force operations are disabled; force steps will be skipped");
        }

        self.execute_plan(&plan, stashed).await
    }

    async fn execute_plan(&self, plan: &RecoveryPlan, stashed: bool) -> OperationResult {
        let guard = StepGuard::new(self.settings.force_push_allowed);
        let mut trail: Vec<ExecutedStep> = Vec::with_capacity(plan.steps.len());

        for (index, step) in plan.steps.iter().enumerate() {
            if self.is_cancelled() {
                return cancelled(trail);
            }

            let record = |status: StepStatus, output: String| ExecutedStep {
                index,
                command: step.command.clone(),
                description: step.description.clone(),
                status,
                output,
            };

            let args = match guard.evaluate(step) {
                StepDecision::Execute { args } => args,
                StepDecision::SkipForeignCommand => {
                    trail.push(record(StepStatus::SkippedForeignCommand, String::new()));
                    continue;
                }
                StepDecision::SkipForceBlocked => {
                    trail.push(record(StepStatus::SkippedForceBlocked, String::new()));
                    continue;
                }
            };

            info!("Executing step {}: {}", index + 1, step.description);
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let outcome = self.executor.run(&self.repo_path, VCS_PROGRAM, &args).await;

            if !outcome.succeeded {
                error!("Step {} failed: {}", index + 1, outcome.output);
                trail.push(record(StepStatus::Failed, outcome.output));
                let details = render_trail(&trail);
                return OperationResult::failed(
                    format!("Step {} failed: {}", index + 1, step.command),
                    Some(details),
                )
                .with_steps(trail);
            }

            trail.push(record(StepStatus::Succeeded, outcome.output));
        }

        if !trail.iter().any(|step| step.status.was_executed()) {
            return OperationResult::failed(
                "All recovery steps were rejected by policy",
                Some(render_trail(&trail)),
            )
            .with_steps(trail);
        }

        if stashed {
            self.restore_stash().await;
        }

        info!("Recovery strategy completed: {}", plan.strategy_description);
        OperationResult::succeeded(
            format!(
                "Successfully executed recovery strategy: {}",
                plan.strategy_description
            ),
            Some(render_trail(&trail)),
        )
        .with_steps(trail)
    }

    /// Stash local changes; true only when git actually created a stash entry.
    async fn stash_changes(&self) -> bool {
        let outcome = self
            .executor
            .run(
                &self.repo_path,
                VCS_PROGRAM,
                &["stash", "push", "-m", AUTO_STASH_MESSAGE],
            )
            .await;

        if !outcome.succeeded {
            warn!("Failed to stash changes: {}", outcome.output);
            false
        } else if outcome.output.contains(NOTHING_TO_STASH) {
            debug!("Nothing to stash");
            false
        } else {
            info!("Stashed local changes");
            true
        }
    }

    async fn restore_stash(&self) {
        self.stash_outstanding.store(false, Ordering::SeqCst);
        let outcome = self
            .executor
            .run(&self.repo_path, VCS_PROGRAM, &["stash", "pop"])
            .await;

        if outcome.succeeded {
            info!("Restored stashed changes");
        } else {
            warn!("Failed to restore stash: {}", outcome.output);
        }
    }

    /// Ask the generator to improve a commit message; `None` when it cannot.
    pub async fn suggest_commit_message(&self, message: &str) -> Option<String> {
        let status = self.status();
        let prompt = build_commit_message_prompt(message, &status);
        self.gateway
            .ask(&prompt)
            .await
            .map(|text| text.trim_matches(|c| c == '"' || c == '`').trim().to_string())
            .filter(|text| !text.is_empty())
    }

    /// Stage everything and commit with `message`.
    pub async fn commit_all(&self, message: &str) -> OperationResult {
        if self.is_cancelled() {
            return cancelled(Vec::new());
        }

        let add = self
            .executor
            .run(&self.repo_path, VCS_PROGRAM, &["add", "."])
            .await;
        if !add.succeeded {
            return OperationResult::failed("Failed to stage changes", Some(add.output));
        }

        if self.is_cancelled() {
            return cancelled(Vec::new());
        }

        let commit = self
            .executor
            .run(&self.repo_path, VCS_PROGRAM, &["commit", "-m", message])
            .await;
        if commit.succeeded {
            OperationResult::succeeded(format!("Committed: {message}"), Some(commit.output))
        } else {
            OperationResult::failed("Commit failed", Some(commit.output))
        }
    }

    fn is_cancelled(&self) -> bool {
        let cancelled = self.cancellation.is_cancelled();
        if cancelled {
            warn!("Operation cancelled");
        }
        cancelled
    }
}

fn cancelled(trail: Vec<ExecutedStep>) -> OperationResult {
    let details = (!trail.is_empty()).then(|| render_trail(&trail));
    OperationResult::failed(OPERATION_CANCELLED, details).with_steps(trail)
}
