// Core types for orchestrated git operations

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// Which top-level operation is being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Pull,
    Push,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Pull => "pull",
            OperationKind::Push => "push",
        }
    }

    /// Capitalized form used in user-facing messages
    pub fn title(&self) -> &'static str {
        match self {
            OperationKind::Pull => "Pull",
            OperationKind::Push => "Push",
        }
    }

    /// Arguments for the direct attempt
    pub fn git_args(&self) -> &'static [&'static str] {
        match self {
            OperationKind::Pull => &["pull"],
            OperationKind::Push => &["push"],
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a single recovery step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    Succeeded,
    Failed,
    /// Not a git command; never handed to the runner
    SkippedForeignCommand,
    /// Carries a force flag while force operations are disabled
    SkippedForceBlocked,
}

impl StepStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Succeeded => "ok",
            StepStatus::Failed => "failed",
            StepStatus::SkippedForeignCommand => "skipped: not a git command",
            StepStatus::SkippedForceBlocked => "skipped: force blocked",
        }
    }

    pub fn was_executed(&self) -> bool {
        matches!(self, StepStatus::Succeeded | StepStatus::Failed)
    }
}

/// Record of one plan step, in plan order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutedStep {
    /// Zero-based position in the plan
    pub index: usize,
    pub command: String,
    pub description: String,
    pub status: StepStatus,
    pub output: String,
}

impl fmt::Display for ExecutedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. [{}] {}",
            self.index + 1,
            self.status.label(),
            self.command
        )?;
        if !self.description.is_empty() {
            write!(f, " ({})", self.description)?;
        }
        if !self.output.is_empty() {
            for line in self.output.lines() {
                write!(f, "\n     {line}")?;
            }
        }
        Ok(())
    }
}

/// Outcome of one orchestrated pull/push
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    /// Raw command output or diagnostic trail, when there is something to show
    pub details: Option<String>,
    pub timestamp: DateTime<Local>,
    pub executed_steps: Vec<ExecutedStep>,
    pub backup_branch: Option<String>,
}

impl OperationResult {
    pub fn succeeded(message: impl Into<String>, details: Option<String>) -> Self {
        Self::new(true, message.into(), details)
    }

    pub fn failed(message: impl Into<String>, details: Option<String>) -> Self {
        Self::new(false, message.into(), details)
    }

    fn new(success: bool, message: String, details: Option<String>) -> Self {
        Self {
            success,
            message,
            details: details.filter(|d| !d.trim().is_empty()),
            timestamp: Local::now(),
            executed_steps: Vec::new(),
            backup_branch: None,
        }
    }

    pub fn with_steps(mut self, steps: Vec<ExecutedStep>) -> Self {
        self.executed_steps = steps;
        self
    }

    pub fn with_backup(mut self, backup_branch: Option<String>) -> Self {
        self.backup_branch = backup_branch;
        self
    }

    /// Steps that actually reached the command runner
    pub fn commands_run(&self) -> impl Iterator<Item = &ExecutedStep> {
        self.executed_steps
            .iter()
            .filter(|step| step.status.was_executed())
    }
}

/// Render the ordered step trail used as operation details.
pub fn render_trail(steps: &[ExecutedStep]) -> String {
    steps
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
