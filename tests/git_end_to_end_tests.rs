/// End-to-end runs against real git repositories with a local bare remote
use git_agent::agent::{GitAgent, StepStatus};
use git_agent::config::GitSettings;
use git_agent::external::ProcessCommandExecutor;
use git_agent::git::{Git2Inspector, RepositoryInspector};
use std::fs;
use std::path::Path;
use std::sync::Arc;

mod fixtures;
use fixtures::repositories::*;
use fixtures::{plan_json, FakeOracle};

fn agent(repo: &Path, oracle: Arc<FakeOracle>) -> GitAgent {
    GitAgent::new(
        repo,
        GitSettings::default(),
        Arc::new(ProcessCommandExecutor::new()),
        Arc::new(Git2Inspector::new()),
        oracle,
    )
}

#[tokio::test]
async fn test_rejected_push_recovered_by_merge_plan() {
    let harness = RemoteHarness::new();
    let alice = harness.clone_as("alice");
    let bob = harness.clone_as("bob");

    commit_file(&bob, "bob.txt", "from bob\n", "Bob's change");
    git(&bob, &["push"]);
    commit_file(&alice, "alice.txt", "from alice\n", "Alice's change");

    let oracle = Arc::new(FakeOracle::responding(&plan_json(
        &["git pull --no-rebase --no-edit", "git push"],
        true,
        "low",
    )));
    let result = agent(&alice, oracle.clone()).push().await;

    assert!(result.success, "{:?}", result);
    assert_eq!(oracle.calls(), 1);
    assert!(result
        .executed_steps
        .iter()
        .all(|step| step.status == StepStatus::Succeeded));

    // seed + bob + alice + merge
    assert_eq!(harness.remote_commit_count(), 4);

    let backup = result.backup_branch.expect("backup branch");
    let branches = git(&alice, &["branch", "--list", "backup/*"]);
    assert!(branches.contains(&backup));
}

#[tokio::test]
async fn test_dirty_pull_stashes_and_restores_local_edits() {
    let harness = RemoteHarness::new();
    let alice = harness.clone_as("alice");
    let bob = harness.clone_as("bob");

    commit_file(&bob, "bob.txt", "from bob\n", "Bob's change");
    git(&bob, &["push"]);
    fs::write(alice.join("README.md"), "# project\nlocal notes\n").unwrap();

    let oracle = Arc::new(FakeOracle::unavailable());
    let result = agent(&alice, oracle.clone()).pull().await;

    assert!(result.success, "{:?}", result);
    assert_eq!(oracle.calls(), 0);
    assert!(alice.join("bob.txt").exists());
    assert_eq!(
        fs::read_to_string(alice.join("README.md")).unwrap(),
        "# project\nlocal notes\n"
    );
    assert!(git(&alice, &["stash", "list"]).trim().is_empty());
}

#[tokio::test]
async fn test_non_git_step_has_no_effect_on_disk() {
    let (_dir, repo) = local_repository();

    // No remote configured, so the push fails and the plan runs
    let oracle = Arc::new(FakeOracle::responding(&plan_json(
        &["touch pwned.txt", "git status --short"],
        true,
        "low",
    )));
    let result = agent(&repo, oracle).push().await;

    assert!(result.success, "{:?}", result);
    assert!(!repo.join("pwned.txt").exists());
    assert_eq!(result.executed_steps[0].status, StepStatus::SkippedForeignCommand);
}

#[tokio::test]
async fn test_inspector_reports_divergence_from_origin() {
    let harness = RemoteHarness::new();
    let alice = harness.clone_as("alice");
    let bob = harness.clone_as("bob");

    commit_file(&bob, "bob.txt", "from bob\n", "Bob's change");
    git(&bob, &["push"]);
    commit_file(&alice, "alice.txt", "from alice\n", "Alice's change");
    git(&alice, &["fetch"]);

    let inspector = Git2Inspector::new();
    let status = inspector.status(&alice);

    assert!(status.is_clean);
    assert_eq!((status.ahead_by, status.behind_by), (1, 1));
    assert_eq!(status, inspector.status(&alice));
}

#[tokio::test]
async fn test_conflicting_pull_reports_conflicted_file() {
    let harness = RemoteHarness::new();
    let alice = harness.clone_as("alice");
    let bob = harness.clone_as("bob");

    commit_file(&bob, "README.md", "# bob's title\n", "Bob edits README");
    git(&bob, &["push"]);
    commit_file(&alice, "README.md", "# alice's title\n", "Alice edits README");

    let oracle = Arc::new(FakeOracle::unavailable());
    let result = agent(&alice, oracle).pull().await;
    assert!(!result.success);

    let status = Git2Inspector::new().status(&alice);
    assert!(!status.is_clean);
    assert_eq!(
        status.conflicted_files.iter().collect::<Vec<_>>(),
        vec!["README.md"]
    );
}
