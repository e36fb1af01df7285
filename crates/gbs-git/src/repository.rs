//! Repository provider backed by the git command-line tool

use crate::command::{GitCommand, GitExecutor};
use gbs_core::{
    BranchRef, BranchStatusError, CommitInfo, CredentialProvider, Remote, Repository,
    RepositoryProvider, Result,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Field separator used in `--format` strings
const SEP: char = '\x1f';

const BRANCH_FORMAT: &str = "--format=%(refname)%1f%(refname:lstrip=2)%1f%(objectname)%1f%(HEAD)";
const COMMIT_FORMAT: &str = "--format=%H%x1f%an%x1f%cn%x1f%ct%x1f%B";

const USERNAME_ENV: &str = "GBS_GIT_USERNAME";
const PASSWORD_ENV: &str = "GBS_GIT_PASSWORD";

const SSH_COMMAND_ENV: &str = "GIT_SSH_COMMAND";
/// ssh fails instead of opening the terminal for a passphrase or host key
const BATCH_SSH_COMMAND: &str = "ssh -o BatchMode=yes";

/// Credential helper that answers `get` requests from the child environment
const CREDENTIAL_HELPER: &str = r#"credential.helper=!f() { test "$1" = get && printf 'username=%s\npassword=%s\n' "$GBS_GIT_USERNAME" "$GBS_GIT_PASSWORD"; }; f"#;

/// Opens repositories with the `git` executable
#[derive(Clone)]
pub struct GitProvider {
    credentials: Arc<dyn CredentialProvider>,
    keychain_item: Option<String>,
}

impl GitProvider {
    pub fn new(credentials: Arc<dyn CredentialProvider>, keychain_item: Option<String>) -> Self {
        Self {
            credentials,
            keychain_item: keychain_item.filter(|s| !s.is_empty()),
        }
    }
}

impl RepositoryProvider for GitProvider {
    fn open(&self, path: &Path) -> Result<Box<dyn Repository>> {
        let executor = Arc::new(GitCommand::new(path));
        let repo = GitRepository::open(executor, self.credentials.clone(), self.keychain_item.clone())?;
        Ok(Box::new(repo))
    }
}

/// One opened git repository
pub struct GitRepository {
    executor: Arc<dyn GitExecutor>,
    root: PathBuf,
    credentials: Arc<dyn CredentialProvider>,
    keychain_item: Option<String>,
}

impl GitRepository {
    /// Open the work tree the executor points at
    pub fn open(
        executor: Arc<dyn GitExecutor>,
        credentials: Arc<dyn CredentialProvider>,
        keychain_item: Option<String>,
    ) -> Result<Self> {
        let requested = executor.repo_root().display().to_string();
        let output = executor
            .exec(&["rev-parse", "--show-toplevel"])
            .map_err(|e| BranchStatusError::RepositoryOpen(format!("{}: {}", requested, e)))?;

        if !output.success {
            return Err(BranchStatusError::RepositoryOpen(requested));
        }

        let root = PathBuf::from(output.stdout.trim());
        debug!("Opened git repository at: {}", root.display());

        Ok(Self {
            executor,
            root,
            credentials,
            keychain_item,
        })
    }

    /// Top-level directory of the work tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.executor.exec(args)?;
        if !output.success {
            return Err(BranchStatusError::Git(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                output.stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    fn fetch_with_credentials(&self, remote: &Remote, item: &str) -> bool {
        let Some(credentials) = self.credentials.retrieve(item) else {
            debug!("No credentials found for keychain item {}", item);
            return false;
        };

        let mut env = fetch_env();
        env.push((USERNAME_ENV, credentials.user.as_str()));
        env.push((PASSWORD_ENV, credentials.password.as_str()));
        let args = [
            "-c",
            "credential.helper=",
            "-c",
            CREDENTIAL_HELPER,
            "fetch",
            "--quiet",
            remote.name.as_str(),
        ];

        match self.executor.exec_with_env(&args, &env) {
            Ok(output) => output.success,
            Err(e) => {
                debug!("Authenticated fetch of {} failed: {}", remote.name, e);
                false
            }
        }
    }
}

impl Repository for GitRepository {
    fn branches(&self) -> Result<Vec<BranchRef>> {
        let stdout = self.run(&["for-each-ref", BRANCH_FORMAT, "refs/heads", "refs/remotes"])?;
        Ok(parse_branches(&stdout))
    }

    fn last_commit(&self, branch: &BranchRef) -> Option<CommitInfo> {
        if branch.target.is_empty() {
            return None;
        }

        match self.run(&["log", "-1", COMMIT_FORMAT, branch.target.as_str()]) {
            Ok(stdout) => parse_commit(&stdout),
            Err(e) => {
                debug!("Cannot read tip of {}: {}", branch.name, e);
                None
            }
        }
    }

    fn ahead_behind(&self, a: &BranchRef, b: &BranchRef) -> Result<(usize, usize)> {
        let range = format!("{}...{}", a.target, b.target);
        let stdout = self.run(&["rev-list", "--left-right", "--count", range.as_str()])?;
        parse_counts(&stdout)
    }

    fn remotes(&self) -> Result<Vec<Remote>> {
        let stdout = self.run(&["remote"])?;
        let remotes = stdout
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                let url = self
                    .run(&["remote", "get-url", name])
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();
                Remote {
                    name: name.to_string(),
                    url,
                }
            })
            .collect();
        Ok(remotes)
    }

    fn fetch(&self, remote: &Remote) -> bool {
        info!("Fetching {}", remote.name);

        let args = ["fetch", "--quiet", remote.name.as_str()];
        let output = match self.executor.exec_with_env(&args, &fetch_env()) {
            Ok(output) => output,
            Err(e) => {
                debug!("Fetch of {} failed: {}", remote.name, e);
                return false;
            }
        };

        if output.success {
            return true;
        }

        match self.keychain_item.as_deref() {
            Some(item) if is_auth_failure(&output.stderr) => self.fetch_with_credentials(remote, item),
            _ => false,
        }
    }
}

/// Whether the user chose their own ssh program for git
fn user_ssh_configured() -> bool {
    std::env::var_os(SSH_COMMAND_ENV).is_some() || std::env::var_os("GIT_SSH").is_some()
}

/// Environment for fetches, which must never prompt on the dashboard's terminal
fn fetch_env<'a>() -> Vec<(&'a str, &'a str)> {
    if user_ssh_configured() {
        Vec::new()
    } else {
        vec![(SSH_COMMAND_ENV, BATCH_SSH_COMMAND)]
    }
}

/// Parse `for-each-ref` output into resolved branches
fn parse_branches(stdout: &str) -> Vec<BranchRef> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.split(SEP);
            let refname = fields.next()?;
            let name = fields.next()?;
            let target = fields.next()?;
            let head = fields.next().unwrap_or("");

            // Remote HEAD is an alias of another remote branch
            if refname.starts_with("refs/remotes/") && refname.ends_with("/HEAD") {
                return None;
            }

            if name.is_empty() || target.is_empty() {
                debug!("Dropping unresolvable reference {}", refname);
                return None;
            }

            Some(BranchRef::new(name, target, head.trim() == "*"))
        })
        .collect()
}

/// Parse `log -1` output into commit metadata
fn parse_commit(stdout: &str) -> Option<CommitInfo> {
    let mut fields = stdout.splitn(5, SEP);
    let hash = fields.next()?.trim();
    if hash.is_empty() {
        return None;
    }

    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    let author_name = fields.next().and_then(non_empty);
    let committer_name = fields.next().and_then(non_empty);
    let timestamp = fields
        .next()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0);
    let message = fields.next().unwrap_or("").trim_end().to_string();

    Some(CommitInfo {
        hash: hash.to_string(),
        author_name,
        committer_name,
        message,
        timestamp,
    })
}

/// Parse `rev-list --left-right --count` output
fn parse_counts(stdout: &str) -> Result<(usize, usize)> {
    let mut parts = stdout.split_whitespace();
    let parse = |s: Option<&str>| -> Result<usize> {
        s.and_then(|v| v.parse().ok()).ok_or_else(|| {
            BranchStatusError::Git(format!("Unexpected rev-list output: {:?}", stdout.trim()))
        })
    };
    let ahead = parse(parts.next())?;
    let behind = parse(parts.next())?;
    Ok((ahead, behind))
}

/// Whether fetch stderr indicates missing or rejected credentials
fn is_auth_failure(stderr: &str) -> bool {
    const MARKERS: [&str; 5] = [
        "Authentication failed",
        "could not read Username",
        "could not read Password",
        "terminal prompts disabled",
        "HTTP Basic: Access denied",
    ];
    MARKERS.iter().any(|m| stderr.contains(m))
}
