//! macOS keychain credential provider
//!
//! Looks up generic-password items by label through the `security` tool.
//! Elsewhere the tool is missing and every lookup comes back empty.

use gbs_core::{CredentialProvider, Credentials, NoCredentials};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::debug;

/// Reads generic-password items from the default keychain
#[derive(Debug, Clone, Copy, Default)]
pub struct KeychainCredentials;

impl KeychainCredentials {
    fn security(args: &[&str]) -> Option<String> {
        let output = match Command::new("security").args(args).stdin(Stdio::null()).output() {
            Ok(output) => output,
            Err(e) => {
                debug!("Failed to run security: {}", e);
                return None;
            }
        };

        if !output.status.success() {
            debug!("security {:?} exited with {}", args.first(), output.status);
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl CredentialProvider for KeychainCredentials {
    fn retrieve(&self, item: &str) -> Option<Credentials> {
        if item.is_empty() {
            return None;
        }

        let attributes = Self::security(&["find-generic-password", "-l", item])?;
        let user = parse_account(&attributes)?;
        let password = Self::security(&["find-generic-password", "-l", item, "-w"])?;
        let password = password.trim_end_matches('\n').to_string();

        if user.is_empty() || password.is_empty() {
            return None;
        }

        Some(Credentials::new(user, password))
    }
}

/// Extract the account attribute from `security find-generic-password` output
fn parse_account(attributes: &str) -> Option<String> {
    attributes.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("\"acct\"<blob>=")?;
        let value = rest.strip_prefix('"')?.strip_suffix('"')?;
        Some(value.to_string())
    })
}

/// Platform credential provider
pub fn default_credential_provider() -> Arc<dyn CredentialProvider> {
    if cfg!(target_os = "macos") {
        Arc::new(KeychainCredentials)
    } else {
        Arc::new(NoCredentials)
    }
}
