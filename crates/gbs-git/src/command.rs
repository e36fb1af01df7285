//! Git command execution abstraction

use gbs_core::{BranchStatusError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Output from a git command
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl GitOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    /// Failed output with the given stderr
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }
}

impl From<Output> for GitOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }
}

/// Trait for executing git commands (allows mocking in tests)
pub trait GitExecutor: Send + Sync {
    /// Execute a git command with extra environment variables
    fn exec_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<GitOutput>;

    /// Execute a git command with the given arguments
    fn exec(&self, args: &[&str]) -> Result<GitOutput> {
        self.exec_with_env(args, &[])
    }

    /// Directory the commands run in
    fn repo_root(&self) -> &Path;
}

/// Real git command executor
#[derive(Debug, Clone)]
pub struct GitCommand {
    repo_root: PathBuf,
}

impl GitCommand {
    /// Create a new git command executor for the given directory
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }
}

impl GitExecutor for GitCommand {
    #[instrument(skip(self, env), fields(repo = %self.repo_root.display()))]
    fn exec_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<GitOutput> {
        debug!("Executing git {:?}", args);

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .args(args)
            .envs(env.iter().copied())
            // Never block the refresh task on an interactive prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BranchStatusError::Git(format!("Failed to execute git: {}", e)))?;

        let git_output = GitOutput::from(output);

        if !git_output.success {
            debug!("Git command failed: {}", git_output.stderr.trim());
        }

        Ok(git_output)
    }

    fn repo_root(&self) -> &Path {
        &self.repo_root
    }
}

/// A command issued to [`MockGitExecutor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub args: String,
    pub env_keys: Vec<String>,
}

/// Mock git executor for testing
#[derive(Debug, Default)]
pub struct MockGitExecutor {
    repo_root: PathBuf,
    responses: HashMap<String, GitOutput>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGitExecutor {
    pub fn new() -> Self {
        Self {
            repo_root: PathBuf::from("/mock/repo"),
            ..Default::default()
        }
    }

    /// Register the output for a command, keyed by its space-joined arguments
    pub fn with_response(mut self, command: &str, output: GitOutput) -> Self {
        self.responses.insert(command.to_string(), output);
        self
    }

    /// Every command executed so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl GitExecutor for MockGitExecutor {
    fn exec_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<GitOutput> {
        let key = args.join(" ");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                args: key.clone(),
                env_keys: env.iter().map(|(k, _)| k.to_string()).collect(),
            });
        }
        self.responses
            .get(&key)
            .cloned()
            .ok_or_else(|| BranchStatusError::Git(format!("No mock response for: {}", key)))
    }

    fn repo_root(&self) -> &Path {
        &self.repo_root
    }
}
