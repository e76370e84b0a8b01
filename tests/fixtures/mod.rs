//! Deterministic collaborators for orchestrator tests, plus throwaway git
//! repositories wired to a local bare remote.
#![allow(dead_code)]

pub mod repositories;

use async_trait::async_trait;
use git_agent::external::{CommandError, CommandExecutor, CommandOutput};
use git_agent::git::{RepositoryInspector, RepositoryStatus};
use git_agent::oracle::{OracleError, StrategyGenerator};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Records every command and answers from a script; unscripted commands succeed.
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: HashMap<String, (bool, String)>,
    cancel_on: Option<(String, CancellationToken)>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed(mut self, command_line: &str, output: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), (true, output.to_string()));
        self
    }

    pub fn fail(mut self, command_line: &str, output: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), (false, output.to_string()));
        self
    }

    /// Cancel `token` while running `command_line`, as Ctrl-C would mid-command.
    pub fn cancel_during(mut self, command_line: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((command_line.to_string(), token));
        self
    }

    /// Full argv of every call, program first
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Every call joined with single spaces
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|argv| argv.join(" ")).collect()
    }

    /// Command lines other than backup branch creation
    pub fn operational_lines(&self) -> Vec<String> {
        self.command_lines()
            .into_iter()
            .filter(|line| !line.starts_with("git branch backup/"))
            .collect()
    }

    pub fn count(&self, command_line: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|line| line.as_str() == command_line)
            .count()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        _working_dir: &Path,
        program: &str,
        args: &[&str],
    ) -> Result<CommandOutput, CommandError> {
        let mut argv = vec![program.to_string()];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        let line = argv.join(" ");
        self.calls.lock().unwrap().push(argv);

        if let Some((trigger, token)) = &self.cancel_on {
            if *trigger == line {
                token.cancel();
            }
        }

        let (succeeded, output) = self
            .responses
            .get(&line)
            .cloned()
            .unwrap_or((true, String::new()));

        Ok(if succeeded {
            CommandOutput {
                status_code: 0,
                stdout: output,
                stderr: String::new(),
            }
        } else {
            CommandOutput {
                status_code: 1,
                stdout: String::new(),
                stderr: output,
            }
        })
    }
}

/// Returns a fixed status and counts inspections.
pub struct FakeInspector {
    status: RepositoryStatus,
    inspections: AtomicUsize,
}

impl FakeInspector {
    pub fn new(status: RepositoryStatus) -> Self {
        Self {
            status,
            inspections: AtomicUsize::new(0),
        }
    }

    pub fn clean() -> Self {
        Self::new(RepositoryStatus::clean())
    }

    /// One tracked file modified in the worktree
    pub fn dirty() -> Self {
        Self::new(RepositoryStatus::new(
            BTreeSet::new(),
            paths(&["src/lib.rs"]),
            BTreeSet::new(),
            BTreeSet::new(),
            0,
            0,
        ))
    }

    pub fn inspections(&self) -> usize {
        self.inspections.load(Ordering::SeqCst)
    }
}

impl RepositoryInspector for FakeInspector {
    fn status(&self, _working_dir: &Path) -> RepositoryStatus {
        self.inspections.fetch_add(1, Ordering::SeqCst);
        self.status.clone()
    }
}

/// Canned generator that records the prompts it receives.
pub struct FakeOracle {
    available: bool,
    response: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeOracle {
    pub fn responding(text: &str) -> Self {
        Self {
            available: true,
            response: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            available: true,
            response: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            response: Ok(String::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StrategyGenerator for FakeOracle {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.response.clone().map_err(|reason| OracleError::InvalidResponse {
            provider: "fake".to_string(),
            reason,
        })
    }
}

pub fn paths(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Oracle response text for a plan with the given steps
pub fn plan_json(steps: &[&str], safe: bool, risk: &str) -> String {
    let steps: Vec<serde_json::Value> = steps
        .iter()
        .enumerate()
        .map(|(i, command)| {
            serde_json::json!({"command": command, "description": format!("step {}", i + 1)})
        })
        .collect();

    let body = serde_json::json!({
        "strategy": "Integrate remote changes",
        "steps": steps,
        "requires_force": false,
        "safe_to_proceed": safe,
        "risk_level": risk,
    });
    format!("Here is the plan:\n```json\n{body:#}\n```")
}
