//! Shared branch and commit types
//!
//! These types are the contract between the repository provider, the
//! snapshot builder and the dashboard renderer. Everything here is rebuilt on
//! every refresh tick and never mutated after construction.

/// Relationship of a branch to the checked-out branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// The branch is HEAD itself
    Current,
    /// HEAD carries commits the branch lacks
    Ahead,
    /// The branch carries commits HEAD lacks
    Behind,
    /// Both sides carry commits the other lacks
    Diverged,
    /// Same tip commit as HEAD
    Identical,
    /// No derivable relationship (unrelated history or unresolved graph)
    Unknown,
}

impl RelationshipKind {
    /// One-character marker shown in front of the branch name
    pub fn marker(&self) -> char {
        match self {
            RelationshipKind::Current => '@',
            RelationshipKind::Ahead => '>',
            RelationshipKind::Behind => '<',
            RelationshipKind::Diverged => '%',
            RelationshipKind::Identical => '=',
            RelationshipKind::Unknown => '?',
        }
    }

    /// Human-readable label, used in logs
    pub fn label(&self) -> &'static str {
        match self {
            RelationshipKind::Current => "current",
            RelationshipKind::Ahead => "ahead",
            RelationshipKind::Behind => "behind",
            RelationshipKind::Diverged => "diverged",
            RelationshipKind::Identical => "identical",
            RelationshipKind::Unknown => "unknown",
        }
    }
}

/// Metadata of the tip commit of a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full hex object id
    pub hash: String,
    /// Author name, if recorded
    pub author_name: Option<String>,
    /// Committer name, if recorded
    pub committer_name: Option<String>,
    /// Full commit message
    pub message: String,
    /// Commit time in seconds since the epoch (0 when unknown)
    pub timestamp: i64,
}

impl CommitInfo {
    /// Abbreviated hash, at most `len` characters
    pub fn short_hash(&self, len: usize) -> &str {
        match self.hash.char_indices().nth(len) {
            Some((idx, _)) => &self.hash[..idx],
            None => &self.hash,
        }
    }

    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Author name, falling back to the committer name
    pub fn display_name(&self) -> &str {
        self.author_name
            .as_deref()
            .or(self.committer_name.as_deref())
            .unwrap_or("")
    }
}

/// A resolved branch reference as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Display name (`main`, `origin/main`)
    pub name: String,
    /// Object id the reference resolves to
    pub target: String,
    /// Whether this is the checked-out branch
    pub is_head: bool,
}

impl BranchRef {
    pub fn new(name: impl Into<String>, target: impl Into<String>, is_head: bool) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            is_head,
        }
    }
}

/// A classified branch, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchView {
    pub name: String,
    pub is_head: bool,
    pub last_commit: Option<CommitInfo>,
    /// Meaningful only for non-head branches
    pub relationship: RelationshipKind,
}

/// Tick-scoped view of every branch in the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    /// The checked-out branch
    pub head: BranchView,
    /// All branches, HEAD included, in no particular order
    pub branches: Vec<BranchView>,
}

/// A configured remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}
