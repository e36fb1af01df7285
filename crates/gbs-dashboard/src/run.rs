//! Entry point for running the dashboard on the real terminal

use crate::{
    app::BranchStatusApp,
    console::{Console, CrosstermConsole},
    session::{Session, SessionConfig},
    Result,
};
use gbs_core::{Config, RepositoryProvider};
use std::sync::Arc;
use tracing::info;

/// Run the dashboard until the user quits
pub fn run(config: Arc<Config>, provider: Arc<dyn RepositoryProvider>) -> Result<()> {
    run_on(Arc::new(CrosstermConsole::new()), config, provider)
}

/// Run the dashboard on `console` until the user quits.
///
/// Returns once the terminal is restored. A tick still in flight, such as a
/// slow `git fetch`, is left to the refresh thread and dies with the process.
pub fn run_on(
    console: Arc<dyn Console>,
    config: Arc<Config>,
    provider: Arc<dyn RepositoryProvider>,
) -> Result<()> {
    let session = Session::new(console, SessionConfig::from(&*config))?;

    info!(
        path = %config.path.display(),
        interval_secs = config.update_interval_secs,
        fetch_origin = config.fetch_origin,
        "Starting dashboard"
    );

    let app = Arc::new(BranchStatusApp::new(config, provider));
    app.attach(&session);

    session.start()
}
