use git2::{BranchType, Repository, Status, StatusOptions};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// Snapshot of working-directory state at one point in time.
///
/// A path may sit in more than one set when git itself reports it that way,
/// e.g. a file that was staged and then edited again is both staged and modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryStatus {
    pub is_clean: bool,
    pub staged_files: BTreeSet<String>,
    pub modified_files: BTreeSet<String>,
    pub untracked_files: BTreeSet<String>,
    pub conflicted_files: BTreeSet<String>,
    pub ahead_by: u32,
    pub behind_by: u32,
}

impl Default for RepositoryStatus {
    fn default() -> Self {
        Self::clean()
    }
}

impl RepositoryStatus {
    /// An empty, clean status. Also the degraded result of a failed inspection.
    pub fn clean() -> Self {
        Self::new(
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
            0,
            0,
        )
    }

    pub fn new(
        staged_files: BTreeSet<String>,
        modified_files: BTreeSet<String>,
        untracked_files: BTreeSet<String>,
        conflicted_files: BTreeSet<String>,
        ahead_by: u32,
        behind_by: u32,
    ) -> Self {
        let is_clean = staged_files.is_empty()
            && modified_files.is_empty()
            && untracked_files.is_empty()
            && conflicted_files.is_empty();

        Self {
            is_clean,
            staged_files,
            modified_files,
            untracked_files,
            conflicted_files,
            ahead_by,
            behind_by,
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicted_files.is_empty()
    }
}

/// Reads working tree and index state for a repository path.
pub trait RepositoryInspector: Send + Sync {
    /// Inspect `working_dir`. Never fails: unreadable repositories report clean.
    fn status(&self, working_dir: &Path) -> RepositoryStatus;
}

/// Inspector backed by libgit2
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Inspector;

impl Git2Inspector {
    pub fn new() -> Self {
        Self
    }

    fn inspect(&self, working_dir: &Path) -> Result<RepositoryStatus, git2::Error> {
        let repo = Repository::discover(working_dir)?;

        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);

        let staged_mask = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE;
        let modified_mask =
            Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_RENAMED | Status::WT_TYPECHANGE;

        let mut staged = BTreeSet::new();
        let mut modified = BTreeSet::new();
        let mut untracked = BTreeSet::new();
        let mut conflicted = BTreeSet::new();

        let statuses = repo.statuses(Some(&mut options))?;
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let status = entry.status();

            if status.is_conflicted() {
                conflicted.insert(path.to_string());
            }
            if status.intersects(staged_mask) {
                staged.insert(path.to_string());
            }
            if status.intersects(modified_mask) {
                modified.insert(path.to_string());
            }
            if status.is_wt_new() {
                untracked.insert(path.to_string());
            }
        }

        let (ahead_by, behind_by) = match divergence(&repo) {
            Ok(counts) => counts,
            Err(e) => {
                debug!("No tracking branch divergence available: {}", e);
                (0, 0)
            }
        };

        Ok(RepositoryStatus::new(
            staged, modified, untracked, conflicted, ahead_by, behind_by,
        ))
    }
}

impl RepositoryInspector for Git2Inspector {
    fn status(&self, working_dir: &Path) -> RepositoryStatus {
        match self.inspect(working_dir) {
            Ok(status) => {
                debug!(
                    clean = status.is_clean,
                    staged = status.staged_files.len(),
                    modified = status.modified_files.len(),
                    untracked = status.untracked_files.len(),
                    conflicted = status.conflicted_files.len(),
                    ahead = status.ahead_by,
                    behind = status.behind_by,
                    "Repository inspected"
                );
                status
            }
            Err(e) => {
                warn!(
                    "Error analyzing git status at {}: {}",
                    working_dir.display(),
                    e
                );
                RepositoryStatus::clean()
            }
        }
    }
}

/// Commits ahead/behind the upstream of the checked-out branch.
fn divergence(repo: &Repository) -> Result<(u32, u32), git2::Error> {
    let head = repo.head()?;
    if !head.is_branch() {
        return Ok((0, 0));
    }

    let Some(branch_name) = head.shorthand() else {
        return Ok((0, 0));
    };
    let branch = repo.find_branch(branch_name, BranchType::Local)?;
    let upstream = branch.upstream()?;

    let (Some(local_oid), Some(upstream_oid)) = (head.target(), upstream.get().target()) else {
        return Ok((0, 0));
    };

    let (ahead, behind) = repo.graph_ahead_behind(local_oid, upstream_oid)?;
    Ok((ahead as u32, behind as u32))
}
