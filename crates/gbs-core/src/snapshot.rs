//! Snapshot construction
//!
//! Builds a [`RepositorySnapshot`] from an opened [`Repository`], classifying
//! every branch against HEAD. Failures on a single branch degrade that branch
//! only; failing to find HEAD aborts the snapshot.

use crate::{
    classify, BranchRef, BranchStatusError, BranchView, Repository, RepositorySnapshot, Result,
};
use std::collections::HashSet;
use tracing::debug;

/// Capture the current state of every branch relative to HEAD.
pub fn capture(repo: &dyn Repository) -> Result<RepositorySnapshot> {
    let head = repo.head()?.ok_or(BranchStatusError::HeadUnavailable)?;
    let refs = repo.branches()?;

    let mut seen = HashSet::new();
    let mut branches = Vec::with_capacity(refs.len() + 1);
    let mut head_view = None;

    for branch in refs {
        if !seen.insert(branch.name.clone()) {
            debug!("Skipping duplicate branch name {}", branch.name);
            continue;
        }

        let view = classify_branch(repo, &head, &branch);
        if view.is_head {
            head_view = Some(view.clone());
        }
        branches.push(view);
    }

    // HEAD can be missing from the listing if it was resolved separately
    let head_view = match head_view {
        Some(view) => view,
        None => {
            let view = classify_branch(repo, &head, &head);
            branches.push(view.clone());
            view
        }
    };

    debug!("Captured snapshot with {} branches", branches.len());

    Ok(RepositorySnapshot {
        head: head_view,
        branches,
    })
}

fn classify_branch(repo: &dyn Repository, head: &BranchRef, branch: &BranchRef) -> BranchView {
    let is_self = branch.name == head.name;
    let last_commit = repo.last_commit(branch);

    let (ahead, behind) = if is_self {
        (0, 0)
    } else {
        repo.ahead_behind(head, branch).unwrap_or_else(|e| {
            debug!("Cannot compute ahead/behind for {}: {}", branch.name, e);
            (0, 0)
        })
    };

    let tip_hash_equal = !branch.target.is_empty() && branch.target == head.target;
    let relationship = classify(is_self, ahead, behind, tip_hash_equal);

    debug!(
        branch = %branch.name,
        ahead,
        behind,
        relationship = relationship.label(),
        "Classified branch"
    );

    BranchView {
        name: branch.name.clone(),
        is_head: is_self,
        last_commit,
        relationship,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommitInfo, RelationshipKind, Remote};
    use std::collections::HashMap;

    /// In-memory repository for snapshot tests
    #[derive(Default)]
    struct FakeRepository {
        branches: Vec<BranchRef>,
        counts: HashMap<String, (usize, usize)>,
        broken_graph: Vec<String>,
    }

    impl FakeRepository {
        fn branch(mut self, name: &str, target: &str, is_head: bool) -> Self {
            self.branches.push(BranchRef::new(name, target, is_head));
            self
        }

        fn counts(mut self, name: &str, ahead: usize, behind: usize) -> Self {
            self.counts.insert(name.to_string(), (ahead, behind));
            self
        }
    }

    impl Repository for FakeRepository {
        fn branches(&self) -> Result<Vec<BranchRef>> {
            Ok(self.branches.clone())
        }

        fn last_commit(&self, branch: &BranchRef) -> Option<CommitInfo> {
            Some(CommitInfo {
                hash: branch.target.clone(),
                author_name: Some("Ada".to_string()),
                committer_name: None,
                message: format!("tip of {}", branch.name),
                timestamp: 1_700_000_000,
            })
        }

        fn ahead_behind(&self, _a: &BranchRef, b: &BranchRef) -> Result<(usize, usize)> {
            if self.broken_graph.contains(&b.name) {
                return Err(BranchStatusError::Git("bad object".to_string()));
            }
            Ok(self.counts.get(&b.name).copied().unwrap_or((0, 0)))
        }

        fn remotes(&self) -> Result<Vec<Remote>> {
            Ok(Vec::new())
        }

        fn fetch(&self, _remote: &Remote) -> bool {
            true
        }
    }

    fn relationship(snapshot: &RepositorySnapshot, name: &str) -> RelationshipKind {
        snapshot
            .branches
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.relationship)
            .unwrap()
    }

    #[test]
    fn test_capture_classifies_all_branches() {
        let repo = FakeRepository::default()
            .branch("main", "aaa", true)
            .branch("old", "bbb", false)
            .branch("new", "ccc", false)
            .branch("split", "ddd", false)
            .branch("copy", "aaa", false)
            .branch("orphan", "eee", false)
            .counts("old", 2, 0)
            .counts("new", 0, 3)
            .counts("split", 1, 1);

        let snapshot = capture(&repo).unwrap();

        assert_eq!(snapshot.head.name, "main");
        assert_eq!(snapshot.branches.len(), 6);
        assert_eq!(relationship(&snapshot, "main"), RelationshipKind::Current);
        assert_eq!(relationship(&snapshot, "old"), RelationshipKind::Ahead);
        assert_eq!(relationship(&snapshot, "new"), RelationshipKind::Behind);
        assert_eq!(relationship(&snapshot, "split"), RelationshipKind::Diverged);
        assert_eq!(relationship(&snapshot, "copy"), RelationshipKind::Identical);
        assert_eq!(relationship(&snapshot, "orphan"), RelationshipKind::Unknown);
    }

    #[test]
    fn test_graph_failure_falls_back_to_tip_equality() {
        let mut repo = FakeRepository::default()
            .branch("main", "aaa", true)
            .branch("same", "aaa", false)
            .branch("other", "bbb", false)
            .counts("other", 5, 0);
        repo.broken_graph = vec!["same".to_string(), "other".to_string()];

        let snapshot = capture(&repo).unwrap();

        assert_eq!(relationship(&snapshot, "same"), RelationshipKind::Identical);
        assert_eq!(relationship(&snapshot, "other"), RelationshipKind::Unknown);
    }

    #[test]
    fn test_missing_head_is_an_error() {
        let repo = FakeRepository::default().branch("topic", "aaa", false);
        let err = capture(&repo).unwrap_err();
        assert!(matches!(err, BranchStatusError::HeadUnavailable));
        assert_eq!(err.to_string(), "Cannot get head");
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let repo = FakeRepository::default()
            .branch("main", "aaa", true)
            .branch("origin/main", "bbb", false)
            .branch("origin/main", "ccc", false);

        let snapshot = capture(&repo).unwrap();
        let dupes: Vec<_> = snapshot
            .branches
            .iter()
            .filter(|b| b.name == "origin/main")
            .collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].last_commit.as_ref().unwrap().hash, "bbb");
    }
}
