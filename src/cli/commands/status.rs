use anyhow::Result;
use std::path::PathBuf;

use super::resolve_repo_path;
use crate::git::{Git2Inspector, RepositoryInspector, RepositoryStatus};

pub struct StatusCommand {
    pub path: PathBuf,
}

impl StatusCommand {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn execute(&self) -> Result<()> {
        let repo_path = resolve_repo_path(&self.path)?;
        println!("📊 Repository status: {}", repo_path.display());

        let status = Git2Inspector::new().status(&repo_path);
        print!("{}", render_status(&status));
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "✅ Yes"
    } else {
        "❌ No"
    }
}

pub fn render_status(status: &RepositoryStatus) -> String {
    let rows = [
        ("Clean working directory", yes_no(status.is_clean).to_string()),
        ("Staged files", status.staged_files.len().to_string()),
        ("Modified files", status.modified_files.len().to_string()),
        ("Untracked files", status.untracked_files.len().to_string()),
        ("Conflicted files", status.conflicted_files.len().to_string()),
        ("Commits ahead", status.ahead_by.to_string()),
        ("Commits behind", status.behind_by.to_string()),
    ];

    let mut out = String::from("\nGIT REPOSITORY STATUS\n─────────────────────\n");
    for (label, value) in rows {
        out.push_str(&format!("   {label:<24} {value}\n"));
    }

    if status.has_conflicts() {
        out.push_str("\n🚨 Conflicted files:\n");
        for path in &status.conflicted_files {
            out.push_str(&format!("  - {path}\n"));
        }
    }
    out
}
