//! Dashboard error types - re-exports the unified error from gbs-core
//!
//! Terminal setup, drawing and session state errors use
//! `BranchStatusError::Terminal` and `BranchStatusError::Session`.

pub use gbs_core::{BranchStatusError, Result};
