use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use super::{build_agent, print_operation_result};
use crate::config::GitAgentConfig;

pub struct SmartCommitCommand {
    pub message: String,
    pub path: PathBuf,
    pub yes: bool,
}

impl SmartCommitCommand {
    pub fn new(message: String, path: PathBuf) -> Self {
        Self {
            message,
            path,
            yes: false,
        }
    }

    pub fn with_auto_accept(mut self, yes: bool) -> Self {
        self.yes = yes;
        self
    }

    pub async fn execute(
        &self,
        config: &GitAgentConfig,
        cancellation: CancellationToken,
    ) -> Result<bool> {
        let agent = build_agent(&self.path, config, cancellation)?;
        println!("🧠 Smart commit for: {}", agent.repo_path().display());

        let mut message = self.message.clone();
        if let Some(suggestion) = agent.suggest_commit_message(&self.message).await {
            println!("💡 LLM suggested: {suggestion}");
            if self.yes || confirm("Use LLM-suggested commit message?")? {
                message = suggestion;
            }
        }

        let result = agent.commit_all(&message).await;
        print_operation_result(&result);
        Ok(result.success)
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }
}
