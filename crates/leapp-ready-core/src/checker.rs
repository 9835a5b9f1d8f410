//! # Layered Readiness Checker
//!
//! Walks the three verification layers outermost-in:
//!
//! ```text
//!   ORG_CHECK ──missing──▶ REMEDIATE ──▶ ORG_CHECK (once) ──missing──▶ FAILED
//!      │                                    │
//!      └────────────── ok ──────────────────┘
//!                       ▼
//!   CV_CHECK ──missing──▶ FAILED        (skipped for the default view)
//!      │
//!      ▼
//!   CONTENT_CHECK ──empty──▶ FAILED
//!      │
//!      ▼
//!    DONE
//! ```
//!
//! Only the organization layer is ever changed. Snapshot membership and
//! channel content need a publish or sync, which is reported, not done.
//! The organization inventory is read fresh on every `ORG_CHECK`; the
//! snapshot is immutable and is fetched at most once per run.

use crate::context::RunContext;
use crate::error::{ReadinessError, RemoteStateError};
use crate::host::HostContext;
use crate::remediation::{EnableReport, RemediationEnabler};
use crate::resolver::{RequiredChannel, RequiredChannelSet};
use crate::source::{ContentQuery, EnableAction, Snapshot};
use crate::types::ChannelId;
use serde::Serialize;
use std::fmt;

// =============================================================================
// STATES
// =============================================================================

/// States of the readiness state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckState {
    OrgCheck,
    Remediate,
    CvCheck,
    ContentCheck,
    Done,
    Failed,
}

impl CheckState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckState::Done | CheckState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckState::OrgCheck => "ORG_CHECK",
            CheckState::Remediate => "REMEDIATE",
            CheckState::CvCheck => "CV_CHECK",
            CheckState::ContentCheck => "CONTENT_CHECK",
            CheckState::Done => "DONE",
            CheckState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Package count observed for one required channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCount {
    pub id: ChannelId,
    pub name: String,
    pub packages: u64,
}

/// A run that reached `DONE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Every state visited, in order, ending with `Done`.
    pub trace: Vec<CheckState>,
    /// Set when the organization layer needed remediation.
    pub remediation: Option<EnableReport>,
    pub channel_counts: Vec<ChannelCount>,
    /// Required channels absent from a default view, so never counted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uncounted: Vec<String>,
}

/// Mutable progress of a single run. Never outlives `run`.
#[derive(Default)]
struct Progress {
    trace: Vec<CheckState>,
    missing: Vec<RequiredChannel>,
    remediation: Option<EnableReport>,
    snapshot: Option<Snapshot>,
    channel_counts: Vec<ChannelCount>,
    uncounted: Vec<String>,
}

// =============================================================================
// CHECKER
// =============================================================================

/// The state machine, bound to one run's context and services.
pub struct ReadinessChecker<'a, Q, E> {
    ctx: &'a RunContext,
    query: &'a Q,
    enabler: RemediationEnabler<'a, E>,
}

impl<'a, Q: ContentQuery, E: EnableAction> ReadinessChecker<'a, Q, E> {
    #[must_use]
    pub fn new(ctx: &'a RunContext, query: &'a Q, enable: &'a E) -> Self {
        Self {
            ctx,
            query,
            enabler: RemediationEnabler::new(enable),
        }
    }

    /// Run from `ORG_CHECK` to a terminal state.
    pub async fn run(
        &self,
        host: &HostContext,
        required: &RequiredChannelSet,
    ) -> Result<CheckOutcome, ReadinessError> {
        let mut progress = Progress::default();
        let mut state = CheckState::OrgCheck;

        while !state.is_terminal() {
            progress.trace.push(state);
            let step = match state {
                CheckState::OrgCheck => self.org_check(host, required, &mut progress).await,
                CheckState::Remediate => self.remediate(host, &mut progress).await,
                CheckState::CvCheck => self.cv_check(host, required, &mut progress).await,
                CheckState::ContentCheck => {
                    self.content_check(host, required, &mut progress).await
                }
                CheckState::Done | CheckState::Failed => break,
            };
            match step {
                Ok(next) => {
                    tracing::debug!(from = ?state, to = ?next, "transition");
                    state = next;
                }
                Err(err) => {
                    progress.trace.push(CheckState::Failed);
                    tracing::warn!(
                        host = %host.name,
                        trace = ?progress.trace,
                        layer = ?err.layer(),
                        "readiness check failed"
                    );
                    return Err(err);
                }
            }
        }

        progress.trace.push(state);
        Ok(CheckOutcome {
            trace: progress.trace,
            remediation: progress.remediation,
            channel_counts: progress.channel_counts,
            uncounted: progress.uncounted,
        })
    }

    async fn org_check(
        &self,
        host: &HostContext,
        required: &RequiredChannelSet,
        progress: &mut Progress,
    ) -> Result<CheckState, ReadinessError> {
        let inventory = self.query.organization_channels(host.organization).await?;
        let missing: Vec<RequiredChannel> = required
            .missing_from(&inventory)
            .into_iter()
            .cloned()
            .collect();

        if missing.is_empty() {
            tracing::info!(
                organization = %host.organization,
                "organization has every required channel enabled"
            );
            return Ok(CheckState::CvCheck);
        }

        let names: Vec<String> = missing.iter().map(|c| c.name.clone()).collect();
        let remediation_attempted = progress.remediation.is_some();
        if remediation_attempted || !self.ctx.remediate() {
            return Err(RemoteStateError::ChannelsNotEnabled {
                organization: host.organization,
                channels: names,
                remediation_attempted,
            }
            .into());
        }

        tracing::warn!(
            organization = %host.organization,
            missing = ?names,
            "organization is missing required channels"
        );
        progress.missing = missing;
        Ok(CheckState::Remediate)
    }

    async fn remediate(
        &self,
        host: &HostContext,
        progress: &mut Progress,
    ) -> Result<CheckState, ReadinessError> {
        let missing: Vec<&RequiredChannel> = progress.missing.iter().collect();
        let report = self.enabler.enable(host.organization, &missing).await?;
        tracing::info!(
            enabled = report.enabled.len(),
            already_enabled = report.already_enabled.len(),
            "remediation finished, re-checking organization"
        );
        progress.remediation = Some(report);
        Ok(CheckState::OrgCheck)
    }

    async fn cv_check(
        &self,
        host: &HostContext,
        required: &RequiredChannelSet,
        progress: &mut Progress,
    ) -> Result<CheckState, ReadinessError> {
        if host.snapshot.default_view {
            tracing::info!("host uses the default organization view, skipping membership check");
            return Ok(CheckState::ContentCheck);
        }

        let snapshot = self.query.snapshot(host.snapshot.id).await?;
        let missing: Vec<String> = required
            .missing_from(&snapshot.channel_names())
            .iter()
            .map(|c| c.name.clone())
            .collect();

        if !missing.is_empty() {
            return Err(RemoteStateError::SnapshotIncomplete {
                snapshot: snapshot.id,
                view: view_name(&snapshot, host),
                channels: missing,
            }
            .into());
        }

        tracing::info!(
            snapshot = %snapshot.id,
            "content view version contains every required channel"
        );
        progress.snapshot = Some(snapshot);
        Ok(CheckState::ContentCheck)
    }

    async fn content_check(
        &self,
        host: &HostContext,
        required: &RequiredChannelSet,
        progress: &mut Progress,
    ) -> Result<CheckState, ReadinessError> {
        let snapshot = match progress.snapshot.take() {
            Some(snapshot) => snapshot,
            None => self.query.snapshot(host.snapshot.id).await?,
        };

        let mut empty = Vec::new();
        for channel in required.channels() {
            let Some(member) = snapshot.channels.iter().find(|m| m.name == channel.name) else {
                // Only reachable for the default view, whose membership is not checked.
                tracing::warn!(channel = %channel.name, "required channel not found in snapshot");
                progress.uncounted.push(channel.name.clone());
                continue;
            };
            let packages = self.query.channel_package_count(member.id).await?;
            tracing::debug!(channel = %member.name, packages, "package count");
            if packages == 0 {
                empty.push(member.name.clone());
            }
            progress.channel_counts.push(ChannelCount {
                id: member.id,
                name: member.name.clone(),
                packages,
            });
        }

        if !empty.is_empty() {
            return Err(RemoteStateError::ChannelsEmpty {
                snapshot: snapshot.id,
                view: view_name(&snapshot, host),
                lifecycle_environment: host.lifecycle_environment.clone(),
                default_view: host.snapshot.default_view,
                channels: empty,
            }
            .into());
        }

        Ok(CheckState::Done)
    }
}

fn view_name(snapshot: &Snapshot, host: &HostContext) -> String {
    if snapshot.parent_view.is_empty() {
        host.snapshot.view_name.clone()
    } else {
        snapshot.parent_view.clone()
    }
}
