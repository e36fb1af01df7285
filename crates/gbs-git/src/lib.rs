//! Git repository provider.
//!
//! This crate implements the [`gbs_core::RepositoryProvider`] contract on top
//! of the `git` executable. Every command goes through a [`GitExecutor`], so
//! tests can substitute [`MockGitExecutor`] for a real repository.

mod command;
mod keychain;
mod repository;

pub use command::{GitCommand, GitExecutor, GitOutput, MockGitExecutor, RecordedCall};
pub use keychain::{default_credential_provider, KeychainCredentials};
pub use repository::{GitProvider, GitRepository};
