//! Prompt construction for the strategy generator.
//!
//! Prompts are deterministic: the same status and failure text always produce
//! the same prompt, which keeps fakes and recorded responses stable.

use crate::agent::OperationKind;
use crate::git::RepositoryStatus;

const RESPONSE_SHAPE: &str = r#"{
    "strategy": "brief description of the approach",
    "steps": [
        {"command": "git command", "description": "what this does"},
        {"command": "git command", "description": "what this does"}
    ],
    "requires_force": true/false,
    "safe_to_proceed": true/false,
    "risk_level": "low/medium/high"
}"#;

pub fn build_recovery_prompt(
    kind: OperationKind,
    status: &RepositoryStatus,
    failure_text: &str,
) -> String {
    let mut prompt = format!(
        "You are an expert Git operations assistant. I need help with a Git {kind} operation that encountered issues.\n\
         \n\
         Current repository status:\n\
         - Clean working directory: {}\n\
         - Staged files: {} files\n\
         - Modified files: {} files\n\
         - Untracked files: {} files\n\
         - Merge conflicts: {} files\n\
         - Commits ahead: {}\n\
         - Commits behind: {}\n",
        status.is_clean,
        status.staged_files.len(),
        status.modified_files.len(),
        status.untracked_files.len(),
        status.conflicted_files.len(),
        status.ahead_by,
        status.behind_by,
    );

    if !failure_text.trim().is_empty() {
        prompt.push_str(&format!("\nError encountered: {}\n", failure_text.trim()));
    }

    if status.has_conflicts() {
        prompt.push_str("\nConflicted files:\n");
        for path in &status.conflicted_files {
            prompt.push_str(&format!("- {path}\n"));
        }
    }

    prompt.push_str(&format!(
        "\nPlease provide a step-by-step solution to successfully complete the {kind} operation.\n\
         Your response should be a JSON object with this structure:\n\
         {RESPONSE_SHAPE}\n\
         \n\
         Only use git commands. Focus on preserving data and ensuring the operation succeeds safely.\n"
    ));

    prompt
}

/// Prompt asking for a better commit message given the pending change counts.
pub fn build_commit_message_prompt(message: &str, status: &RepositoryStatus) -> String {
    format!(
        "Please review and improve this git commit message: \"{message}\"\n\
         \n\
         Current repository changes:\n\
         - Modified files: {}\n\
         - Staged files: {}\n\
         - Untracked files: {}\n\
         \n\
         Provide a better commit message following conventional commit format if appropriate.\n\
         Respond with just the improved commit message, nothing else.\n",
        status.modified_files.len(),
        status.staged_files.len(),
        status.untracked_files.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prompt_embeds_counts_and_failure() {
        let status = RepositoryStatus::new(
            set(&["a.rs"]),
            set(&["b.rs", "c.rs"]),
            BTreeSet::new(),
            BTreeSet::new(),
            2,
            5,
        );

        let prompt = build_recovery_prompt(
            OperationKind::Push,
            &status,
            "! [rejected] main -> main (fetch first)",
        );

        assert!(prompt.contains("Git push operation"));
        assert!(prompt.contains("- Clean working directory: false"));
        assert!(prompt.contains("- Staged files: 1 files"));
        assert!(prompt.contains("- Modified files: 2 files"));
        assert!(prompt.contains("- Commits ahead: 2"));
        assert!(prompt.contains("- Commits behind: 5"));
        assert!(prompt.contains("Error encountered: ! [rejected] main -> main (fetch first)"));
        assert!(!prompt.contains("Conflicted files:"));
        assert!(prompt.contains("\"safe_to_proceed\""));
    }

    #[test]
    fn test_prompt_lists_conflicted_paths_in_order() {
        let status = RepositoryStatus::new(
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
            set(&["src/z.rs", "src/a.rs"]),
            0,
            1,
        );

        let prompt = build_recovery_prompt(OperationKind::Pull, &status, "");

        assert!(prompt.contains("Conflicted files:\n- src/a.rs\n- src/z.rs\n"));
        assert!(!prompt.contains("Error encountered"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let status = RepositoryStatus::new(
            set(&["x"]),
            set(&["y"]),
            set(&["z"]),
            set(&["w"]),
            1,
            1,
        );

        assert_eq!(
            build_recovery_prompt(OperationKind::Pull, &status, "boom"),
            build_recovery_prompt(OperationKind::Pull, &status, "boom")
        );
    }

    #[test]
    fn test_commit_message_prompt() {
        let status = RepositoryStatus::new(
            set(&["a"]),
            set(&["b", "c"]),
            BTreeSet::new(),
            BTreeSet::new(),
            0,
            0,
        );
        let prompt = build_commit_message_prompt("fix stuff", &status);

        assert!(prompt.contains("\"fix stuff\""));
        assert!(prompt.contains("- Modified files: 2"));
        assert!(prompt.contains("- Staged files: 1"));
    }
}
