//! Dashboard application logic
//!
//! [`BranchStatusApp`] owns the configuration and the repository provider and
//! turns each refresh tick into a sorted snapshot or an inline error. It plugs
//! into a [`Session`] through the three handler kinds.

use crate::{
    event::{is_quit_event, is_refresh_event},
    layout::Theme,
    session::Session,
    ui, Result,
};
use gbs_core::{capture, sort_for_display, Config, Repository, RepositoryProvider, RepositorySnapshot};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Name of the remote fetched when fetching is enabled
pub const ORIGIN: &str = "origin";

/// Result of one refresh tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Snapshot with branches in display order
    Snapshot(RepositorySnapshot),
    /// The tick failed; shown as a single error line
    Error(String),
}

/// Branch dashboard bound to one repository path
pub struct BranchStatusApp {
    config: Arc<Config>,
    provider: Arc<dyn RepositoryProvider>,
    /// Outcome of the latest tick, repainted on resize
    last: Mutex<Option<TickOutcome>>,
}

impl BranchStatusApp {
    pub fn new(config: Arc<Config>, provider: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            config,
            provider,
            last: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build this tick's view of the repository
    ///
    /// Never fails: open and HEAD errors become [`TickOutcome::Error`].
    pub fn tick(&self) -> TickOutcome {
        match self.snapshot() {
            Ok(snapshot) => {
                debug!(
                    head = %snapshot.head.name,
                    branches = snapshot.branches.len(),
                    "Snapshot captured"
                );
                TickOutcome::Snapshot(snapshot)
            }
            Err(e) => {
                warn!("Refresh failed: {}", e);
                TickOutcome::Error(e.to_string())
            }
        }
    }

    fn snapshot(&self) -> Result<RepositorySnapshot> {
        let repo = self.provider.open(&self.config.path)?;

        if self.config.fetch_origin {
            fetch_origin(repo.as_ref());
        }

        let mut snapshot = capture(repo.as_ref())?;
        let head_name = snapshot.head.name.clone();
        sort_for_display(&mut snapshot.branches, &head_name, self.config.promote_upstream);
        Ok(snapshot)
    }

    /// Tick, then paint the outcome on the session's console
    pub fn refresh(&self, session: &Session) {
        let outcome = self.tick();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        paint(session, &outcome);
        *last = Some(outcome);
    }

    /// Paint the latest outcome again without touching the repository
    ///
    /// Before the first tick there is nothing to show, so a tick is requested.
    pub fn repaint(&self, session: &Session) {
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        match last.as_ref() {
            Some(outcome) => paint(session, outcome),
            None => session.request_update(),
        }
    }

    /// Register the dashboard's handlers on `session`
    ///
    /// - update: refresh and repaint
    /// - key: `q`/Ctrl+C stops the session, `r`/F5 refreshes now
    /// - resize: repaints the latest outcome at the new size
    pub fn attach(self: &Arc<Self>, session: &Session) {
        let app = Arc::clone(self);
        session.on_update(move |session| app.refresh(session));

        session.on_key_press(|session, key| {
            if is_quit_event(key) {
                session.stop();
            } else if is_refresh_event(key) {
                session.request_update();
            }
        });

        let app = Arc::clone(self);
        session.on_resize(move |session| app.repaint(session));
    }
}

fn paint(session: &Session, outcome: &TickOutcome) {
    let theme = Theme::new(session.supports_colors());
    if let Err(e) = session.draw(&mut |frame| ui::draw(frame, outcome, theme)) {
        warn!("Failed to draw: {}", e);
    }
}

/// Fetch `origin` if it exists; failures are logged and otherwise ignored
fn fetch_origin(repo: &dyn Repository) {
    let remotes = match repo.remotes() {
        Ok(remotes) => remotes,
        Err(e) => {
            debug!("Failed to list remotes: {}", e);
            return;
        }
    };

    match remotes.iter().find(|r| r.name == ORIGIN) {
        Some(origin) => {
            if !repo.fetch(origin) {
                debug!(remote = %origin.name, "Fetch failed");
            }
        }
        None => debug!("No {} remote to fetch", ORIGIN),
    }
}
