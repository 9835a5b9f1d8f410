//! # Validate Entry Point
//!
//! The single call a CLI or automation wrapper makes:
//!
//! 1. look the host up and derive its context,
//! 2. resolve the required channel set for its platform and the target,
//! 3. run the layered checker.
//!
//! Any failure comes back as a [`ReadinessFailure`]: the typed
//! [`ReadinessError`] plus whatever host warnings were found before it.
//! Success comes back as a [`ReadinessReport`].

use crate::checker::{CheckOutcome, ReadinessChecker};
use crate::context::RunContext;
use crate::error::ReadinessError;
use crate::host::{HostContext, HostWarning, resolve_host};
use crate::resolver::{RequiredChannelSet, resolve_target};
use crate::source::{ContentQuery, EnableAction, HostDirectory};
use crate::types::TargetRelease;
use serde::Serialize;
use thiserror::Error;

/// The remote services one run uses.
///
/// The enable action is separate from the queries so it can travel over a
/// different transport.
pub struct Services<'a, H, Q, E> {
    pub hosts: &'a H,
    pub content: &'a Q,
    pub enable: &'a E,
}

/// Everything learned by a run that reached `DONE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    pub host: HostContext,
    pub target: TargetRelease,
    pub required: RequiredChannelSet,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    pub warnings: Vec<HostWarning>,
}

/// A run that did not reach `DONE`.
///
/// Warnings stay attached: an outdated host explains many failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ReadinessFailure {
    pub error: ReadinessError,
    pub warnings: Vec<HostWarning>,
}

impl ReadinessFailure {
    fn with_warnings(error: impl Into<ReadinessError>, warnings: &[HostWarning]) -> Self {
        Self {
            error: error.into(),
            warnings: warnings.to_vec(),
        }
    }
}

impl From<ReadinessError> for ReadinessFailure {
    fn from(error: ReadinessError) -> Self {
        Self {
            error,
            warnings: Vec::new(),
        }
    }
}

/// Decide whether the host in `ctx` is ready to upgrade.
pub async fn validate<H, Q, E>(
    ctx: &RunContext,
    services: &Services<'_, H, Q, E>,
) -> Result<ReadinessReport, ReadinessFailure>
where
    H: HostDirectory,
    Q: ContentQuery,
    E: EnableAction,
{
    tracing::info!(host = ctx.host(), target = %ctx.target(), "validating host");

    let resolved = resolve_host(services.hosts, ctx).await?;
    let host = resolved.context;
    let warnings = resolved.warnings;

    let required = resolve_target(host.architecture, host.sub_architecture, ctx.target())
        .map_err(|e| ReadinessFailure::with_warnings(e, &warnings))?;
    tracing::info!(
        platform = %required.platform(),
        channels = required.len(),
        "resolved required channels"
    );

    let checker = ReadinessChecker::new(ctx, services.content, services.enable);
    let outcome = checker
        .run(&host, &required)
        .await
        .map_err(|e| ReadinessFailure::with_warnings(e, &warnings))?;

    tracing::info!(host = %host.name, "host is ready to upgrade");
    Ok(ReadinessReport {
        host,
        target: ctx.target(),
        required,
        outcome,
        warnings,
    })
}
