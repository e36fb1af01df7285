//! Repository provider contract
//!
//! The dashboard never touches version-control internals directly. Everything
//! it knows about a repository comes through these two traits, which keeps the
//! snapshot builder testable with an in-memory fake.

use crate::{BranchRef, CommitInfo, Remote, Result};
use std::path::Path;

/// Opens repositories. Shared with the refresh task for the whole session.
pub trait RepositoryProvider: Send + Sync {
    /// Open the repository containing `path`
    fn open(&self, path: &Path) -> Result<Box<dyn Repository>>;
}

/// One opened repository, used for the duration of a single tick.
pub trait Repository {
    /// Every resolvable branch. References that fail to resolve are omitted.
    fn branches(&self) -> Result<Vec<BranchRef>>;

    /// The checked-out branch, if HEAD points at one
    fn head(&self) -> Result<Option<BranchRef>> {
        Ok(self.branches()?.into_iter().find(|b| b.is_head))
    }

    /// Tip commit metadata, `None` when the tip cannot be dereferenced
    fn last_commit(&self, branch: &BranchRef) -> Option<CommitInfo>;

    /// `(ahead, behind)`: commits reachable from `a` but not `b`, and the reverse
    fn ahead_behind(&self, a: &BranchRef, b: &BranchRef) -> Result<(usize, usize)>;

    /// Configured remotes
    fn remotes(&self) -> Result<Vec<Remote>>;

    /// Fetch from a remote. Blocking; reports success only.
    fn fetch(&self, remote: &Remote) -> bool;
}
