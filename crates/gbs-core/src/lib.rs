//! # gbs-core
//!
//! Core types for git-branch-status.
//!
//! Every refresh tick the dashboard opens the repository through a
//! [`RepositoryProvider`], builds a [`RepositorySnapshot`] with [`capture`],
//! and orders it with [`sort_for_display`]. Each branch carries one
//! [`RelationshipKind`] relative to HEAD:
//!
//! ```text
//! @ main        HEAD itself
//! > release     HEAD is ahead
//! < feature/x   HEAD is behind
//! % spike       diverged
//! = origin/main same tip
//! ? gh-pages    no derivable relationship
//! ```

mod config;
mod credentials;
mod error;
mod provider;
mod relationship;
mod snapshot;
mod types;

pub use config::Config;
pub use credentials::{CredentialProvider, Credentials, NoCredentials, StaticCredentials};
pub use error::{BranchStatusError, Result};
pub use provider::{Repository, RepositoryProvider};
pub use relationship::{classify, sort_for_display};
pub use snapshot::capture;
pub use types::*;
