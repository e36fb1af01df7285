//! # gbs-dashboard
//!
//! Live terminal dashboard of git branches and their relationship to HEAD.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────── refresh thread ────────────────┐
//! │ on_update ─▶ open repo ─▶ fetch? ─▶ capture    │
//! │           ─▶ sort ─▶ layout_rows ─▶ draw       │
//! └────────────────────────────────────────────────┘
//! ┌──────────────── foreground loop ───────────────┐
//! │ size changed? ─▶ on_resize ─▶ repaint last     │
//! │ key pressed?  ─▶ on_key_press (q quits)        │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The [`Session`] owns both loops and the terminal; [`BranchStatusApp`]
//! supplies the handlers. Layout is pure and lives in [`layout`].

mod error;

pub use error::{BranchStatusError, Result};

mod app;
mod console;
mod event;
pub mod layout;
mod run;
mod session;
mod ui;
mod widgets;

pub use app::{BranchStatusApp, TickOutcome, ORIGIN};
pub use console::{Console, ConsoleGuard, CrosstermConsole, ScriptedConsole, Tui};
pub use event::{is_quit_event, is_refresh_event};
pub use layout::{error_row, layout_rows, Dimensions, RenderedRow, Segment, Theme};
pub use run::{run, run_on};
pub use session::{KeyHandler, ResizeHandler, Session, SessionConfig, SessionPhase, UpdateHandler};
pub use widgets::BranchListWidget;
