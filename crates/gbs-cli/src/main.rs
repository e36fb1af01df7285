//! git-branch-status - live dashboard of git branches relative to HEAD
//!
//! Usage:
//!   git-branch-status [PATH]                 Watch the repository at PATH
//!   git-branch-status --fetch-origin         Fetch origin before every refresh
//!   git-branch-status --keychain-item NAME   Credentials for authenticated fetches
//!
//! Keys: `q` or Ctrl+C quits, `r` or F5 refreshes now.

use anyhow::{Context, Result};
use clap::Parser;
use gbs_core::Config;
use gbs_git::{default_credential_provider, GitProvider};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "git-branch-status")]
#[command(author, version, about = "Live dashboard of git branches and their relationship to HEAD")]
#[command(long_about = "Live dashboard of git branches and their relationship to HEAD.

Local and remote-tracking branches are listed together. Symbolic remote \
HEADs such as origin/HEAD are skipped since they only alias another \
remote-tracking branch.

Keys: q or Ctrl+C quits, r or F5 refreshes now.")]
struct Cli {
    /// Repository path
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Fetch the `origin` remote at the start of every refresh
    #[arg(long)]
    fetch_origin: bool,

    /// Keychain item holding credentials for authenticated fetches
    #[arg(long, value_name = "NAME")]
    keychain_item: Option<String>,

    /// Keep `origin/<head>` in plain name order instead of right after HEAD
    #[arg(long)]
    no_promote_upstream: bool,

    /// Seconds between refreshes
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file (the terminal belongs to the dashboard)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Configuration file values with command-line overrides applied
    fn to_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;

        config.path = self.path.clone();
        if self.fetch_origin {
            config.fetch_origin = true;
        }
        if let Some(item) = &self.keychain_item {
            config.keychain_item = Some(item.clone());
        }
        if self.no_promote_upstream {
            config.promote_upstream = false;
        }
        if let Some(interval) = self.interval {
            config.update_interval_secs = interval;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_file) = &cli.log_file {
        init_logging(log_file, cli.verbose)?;
    }

    let config = Arc::new(cli.to_config()?);
    info!("Watching {}", config.path.display());

    let provider = Arc::new(GitProvider::new(
        default_credential_provider(),
        config.keychain_item().map(str::to_string),
    ));

    gbs_dashboard::run(config, provider).context("Dashboard failed")?;

    Ok(())
}

/// Send logs to `path`; `RUST_LOG` overrides the level
fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
