//! Real git repositories for end-to-end tests: a bare "origin" and any
//! number of clones with identity configured.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const BRANCH: &str = "main";

pub struct RemoteHarness {
    root: TempDir,
    remote: PathBuf,
}

impl RemoteHarness {
    /// Bare remote seeded with one commit on `main`, pushed from a clone named "seed".
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let remote = root.path().join("origin.git");
        git(root.path(), &["init", "--bare", remote.to_str().unwrap()]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let harness = Self { root, remote };
        let seed = harness.root.path().join("seed");
        git(
            harness.root.path(),
            &["clone", harness.remote.to_str().unwrap(), seed.to_str().unwrap()],
        );
        configure_identity(&seed);
        git(&seed, &["checkout", "-b", BRANCH]);
        commit_file(&seed, "README.md", "# project\n", "Initial commit");
        git(&seed, &["push", "-u", "origin", BRANCH]);
        harness
    }

    pub fn remote(&self) -> &Path {
        &self.remote
    }

    /// Fresh clone tracking `origin/main`
    pub fn clone_as(&self, name: &str) -> PathBuf {
        let dir = self.root.path().join(name);
        git(
            self.root.path(),
            &["clone", self.remote.to_str().unwrap(), dir.to_str().unwrap()],
        );
        configure_identity(&dir);
        dir
    }

    /// Number of commits on the remote's main branch
    pub fn remote_commit_count(&self) -> usize {
        git(&self.remote, &["rev-list", "--count", BRANCH])
            .trim()
            .parse()
            .unwrap()
    }
}

/// Standalone repository without any remote
pub fn local_repository() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_path_buf();
    git(&path, &["init"]);
    configure_identity(&path);
    commit_file(&path, "README.md", "# local\n", "Initial commit");
    (dir, path)
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "pull.rebase", "false"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

pub fn commit_file(dir: &Path, file: &str, content: &str, message: &str) {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    git(dir, &["add", file]);
    git(dir, &["commit", "-m", message]);
}

/// Run git and return stdout, panicking with stderr on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}
