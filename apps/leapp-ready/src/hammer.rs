//! # Hammer Enable Path
//!
//! Enables repository sets by running `hammer repository-set enable` on the
//! local machine, for Satellite servers where the operator prefers the
//! command-line tool's stored credentials over API access.

use crate::client::is_already_enabled;
use leapp_ready_core::{EnableAction, EnableOutcome, OrganizationId, RequiredChannel, TransportError};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Longest command output kept in a rejection reason.
const MAX_OUTPUT_LEN: usize = 300;

/// Runs `hammer` as a child process for each enable.
#[derive(Debug, Clone)]
pub struct HammerEnabler {
    program: PathBuf,
}

impl HammerEnabler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for one enable call.
    pub fn arguments(organization: OrganizationId, channel: &RequiredChannel) -> Vec<String> {
        let mut args = vec![
            "repository-set".to_string(),
            "enable".to_string(),
            "--organization-id".to_string(),
            organization.to_string(),
            "--name".to_string(),
            channel.repository_set.clone(),
            "--basearch".to_string(),
            channel.basearch.as_str().to_string(),
        ];
        if let Some(release) = &channel.release {
            args.push("--releasever".to_string());
            args.push(release.clone());
        }
        args
    }
}

impl EnableAction for HammerEnabler {
    async fn enable_channel(
        &self,
        organization: OrganizationId,
        channel: &RequiredChannel,
    ) -> Result<EnableOutcome, TransportError> {
        let args = Self::arguments(organization, channel);
        tracing::debug!(program = %self.program.display(), ?args, "running hammer");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| TransportError::Command(format!("{}: {e}", self.program.display())))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{} {}", stdout.trim(), stderr.trim());
        let combined = combined.trim();

        if is_already_enabled(combined) {
            return Ok(EnableOutcome::AlreadyEnabled);
        }
        if output.status.success() {
            return Ok(EnableOutcome::Enabled);
        }

        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        let reason: String = combined.chars().take(MAX_OUTPUT_LEN).collect();
        Ok(EnableOutcome::Rejected(format!("hammer exited with {code}: {reason}")))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use leapp_ready_core::{Architecture, TargetRelease, resolve_target};

    #[test]
    fn arguments_carry_release_only_when_pinned() {
        let set = resolve_target(Architecture::X86_64, None, TargetRelease::Rhel8_8).expect("x86_64");
        for channel in set.channels() {
            let args = HammerEnabler::arguments(OrganizationId(4), channel);
            assert_eq!(&args[..4], ["repository-set", "enable", "--organization-id", "4"]);
            assert!(args.contains(&channel.repository_set));
            assert_eq!(args.contains(&"--releasever".to_string()), channel.release.is_some());
        }
    }
}
