//! # Remediation Enabler
//!
//! Enables channels the organization is missing, in resolution order.
//!
//! - "Already enabled" is a success: a previous or concurrent run got there
//!   first, so re-running is safe.
//! - Any other refusal stops remediation at that channel. Channels after it
//!   are not attempted.
//! - Each channel is scoped by its repository set, `basearch`, organization
//!   and release qualifier. The qualifier was fixed when the required set was
//!   resolved: the legacy release for pre-upgrade channels, the target
//!   release for post-upgrade channels, none for unversioned ones.

use crate::error::{ReadinessError, RemediationError};
use crate::resolver::RequiredChannel;
use crate::source::{EnableAction, EnableOutcome};
use crate::types::OrganizationId;
use serde::Serialize;

/// What one remediation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnableReport {
    /// Channels this run switched on.
    pub enabled: Vec<String>,
    /// Channels the server said were already on.
    pub already_enabled: Vec<String>,
}

impl EnableReport {
    /// Total channels accepted by the server.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.enabled.len() + self.already_enabled.len()
    }
}

/// Drives an [`EnableAction`] over a list of missing channels.
pub struct RemediationEnabler<'a, E> {
    action: &'a E,
}

impl<'a, E: EnableAction> RemediationEnabler<'a, E> {
    #[must_use]
    pub fn new(action: &'a E) -> Self {
        Self { action }
    }

    /// Enable every channel in `missing` for `organization`.
    ///
    /// Stops at the first refusal with `RemediationError::EnableRejected`.
    /// Transport failures abort as `TransportError`.
    pub async fn enable(
        &self,
        organization: OrganizationId,
        missing: &[&RequiredChannel],
    ) -> Result<EnableReport, ReadinessError> {
        let mut report = EnableReport::default();

        for channel in missing {
            tracing::info!(
                organization = %organization,
                channel = %channel.name,
                basearch = %channel.basearch,
                release = channel.release.as_deref().unwrap_or("-"),
                "enabling channel"
            );
            match self.action.enable_channel(organization, channel).await? {
                EnableOutcome::Enabled => report.enabled.push(channel.name.clone()),
                EnableOutcome::AlreadyEnabled => {
                    tracing::debug!(channel = %channel.name, "channel already enabled");
                    report.already_enabled.push(channel.name.clone());
                }
                EnableOutcome::Rejected(reason) => {
                    tracing::error!(channel = %channel.name, reason = %reason, "enable rejected");
                    return Err(RemediationError::EnableRejected {
                        channel: channel.name.clone(),
                        reason,
                    }
                    .into());
                }
            }
        }

        Ok(report)
    }
}
