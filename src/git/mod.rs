//! Git repository module
//!
//! Repository inspection is done with libgit2 bindings; history-changing
//! operations (backup branches, stash, pull/push) go through the command
//! executor so they behave exactly like the user's own git.

pub mod backup;
pub mod status;

pub use backup::{backup_branch_name, BackupManager, BackupOutcome, BACKUP_BRANCH_PREFIX};
pub use status::{Git2Inspector, RepositoryInspector, RepositoryStatus};
