//! End-to-end checks of the git provider against a scratch repository.
//!
//! Skipped when no `git` executable is available.

use gbs_core::{capture, NoCredentials, RelationshipKind, Repository, RepositoryProvider};
use gbs_git::GitProvider;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Ada", "-c", "user.email=ada@example.com", "-c", "commit.gpgsign=false"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

/// main: A - B
/// behind: A - B - C
/// ahead: A
/// diverged: A - D
/// same: A - B
fn scratch_repo() -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["commit", "-q", "--allow-empty", "-m", "A"]);
    git(dir, &["branch", "ahead"]);
    git(dir, &["branch", "diverged"]);
    git(dir, &["commit", "-q", "--allow-empty", "-m", "B\n\nbody"]);
    git(dir, &["branch", "same"]);
    git(dir, &["checkout", "-q", "-b", "behind"]);
    git(dir, &["commit", "-q", "--allow-empty", "-m", "C"]);
    git(dir, &["checkout", "-q", "diverged"]);
    git(dir, &["commit", "-q", "--allow-empty", "-m", "D"]);
    git(dir, &["checkout", "-q", "main"]);

    temp
}

#[test]
fn test_snapshot_of_scratch_repository() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }

    let temp = scratch_repo();
    let provider = GitProvider::new(Arc::new(NoCredentials), None);
    let repo = provider.open(temp.path()).unwrap();
    let snapshot = capture(&*repo).unwrap();

    assert_eq!(snapshot.head.name, "main");
    assert_eq!(snapshot.head.last_commit.as_ref().unwrap().summary(), "B");

    let kind = |name: &str| {
        snapshot
            .branches
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.relationship)
    };

    assert_eq!(kind("main"), Some(RelationshipKind::Current));
    assert_eq!(kind("ahead"), Some(RelationshipKind::Ahead));
    assert_eq!(kind("behind"), Some(RelationshipKind::Behind));
    assert_eq!(kind("diverged"), Some(RelationshipKind::Diverged));
    assert_eq!(kind("same"), Some(RelationshipKind::Identical));
}

#[test]
fn test_open_outside_repository_fails() {
    if !git_available() {
        return;
    }

    let temp = TempDir::new().unwrap();
    let provider = GitProvider::new(Arc::new(NoCredentials), None);
    assert!(provider.open(&temp.path().join("missing")).is_err());
}

#[test]
fn test_detached_head_has_no_head_branch() {
    if !git_available() {
        return;
    }

    let temp = scratch_repo();
    git(temp.path(), &["checkout", "-q", "--detach", "main"]);

    let provider = GitProvider::new(Arc::new(NoCredentials), None);
    let repo = provider.open(temp.path()).unwrap();
    assert!(repo.head().unwrap().is_none());
    assert!(capture(&*repo).is_err());
}
