//! Dashboard widgets
//!
//! Widgets paint already laid-out rows; they make no layout decisions.

mod branch_list;

pub use branch_list::BranchListWidget;
