//! # Error Taxonomy
//!
//! Five classes, each owned by the party that has to act on it:
//!
//! | Class | Cause | Retry? |
//! |-------|-------|--------|
//! | `InputError` | unsupported release/architecture, ambiguous sub-architecture | never |
//! | `HostStateError` | missing/stale facts, unsupported OS version | after fixing the host |
//! | `RemoteStateError` | channel not enabled, not in snapshot, or empty | after fixing the server |
//! | `TransportError` | network, timeout, authentication | caller's choice |
//! | `RemediationError` | enable action refused | never, investigate |
//!
//! Every component returns one of these up to `validate`. Readiness failures
//! always carry the layer and the full list of offending channel names.

use crate::types::{Architecture, OrganizationId, OsVersion, SnapshotId, SubArchitecture};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

// =============================================================================
// INPUT ERRORS
// =============================================================================

/// The caller asked for something the catalog cannot answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unsupported target release '{requested}' (supported: {supported})")]
    UnsupportedRelease { requested: String, supported: String },

    #[error("unsupported architecture '{0}' (supported: x86_64, ppc64le, s390x)")]
    UnsupportedArchitecture(String),

    #[error("unsupported sub-architecture '{0}' (supported: power8, power9)")]
    UnsupportedSubArchitecture(String),

    #[error("architecture {0} needs a sub-architecture (power8 or power9); pass --sub-arch")]
    AmbiguousSubArchitecture(Architecture),

    #[error("sub-architecture {sub} does not apply to architecture {arch}")]
    SubArchitectureNotApplicable {
        arch: Architecture,
        sub: SubArchitecture,
    },
}

// =============================================================================
// HOST STATE ERRORS
// =============================================================================

/// Which part of the facts is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactsGap {
    /// The host never uploaded facts.
    NeverReported,
    /// Facts exist but `distribution::version` is absent; the agent needs a
    /// facts refresh.
    VersionKeyAbsent,
}

impl fmt::Display for FactsGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactsGap::NeverReported => f.write_str("host has never reported facts"),
            FactsGap::VersionKeyAbsent => {
                f.write_str("facts lack 'distribution::version'; run `subscription-manager facts --update` on the host")
            }
        }
    }
}

/// The host record cannot be evaluated until the host itself is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostStateError {
    #[error("host '{0}' not found")]
    HostNotFound(String),

    #[error("host '{0}' has no architecture recorded")]
    ArchitectureUnknown(String),

    #[error("host '{host}': {gap}")]
    FactsMissing { host: String, gap: FactsGap },

    #[error("host '{host}' reports an unreadable version '{value}'")]
    MalformedVersion { host: String, value: String },

    #[error("host '{host}' runs major version {found}; only {supported} can be upgraded")]
    UnsupportedMajorVersion {
        host: String,
        found: u32,
        supported: u32,
    },

    #[error("host '{host}' runs {current}; update to {latest} before upgrading")]
    OutdatedMinor {
        host: String,
        current: OsVersion,
        latest: OsVersion,
    },

    #[error("host '{0}' is not registered as a content host (no organization or content view)")]
    NotContentHost(String),
}

// =============================================================================
// REMOTE STATE ERRORS
// =============================================================================

/// The verification layer at which a readiness check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Organization,
    ContentView,
    Content,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Organization => f.write_str("organization"),
            Layer::ContentView => f.write_str("content view"),
            Layer::Content => f.write_str("content"),
        }
    }
}

/// The server-side configuration does not satisfy the required set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteStateError {
    #[error(
        "organization {organization} is missing {} required channel(s){}",
        .channels.len(),
        after_enabling(.remediation_attempted)
    )]
    ChannelsNotEnabled {
        organization: OrganizationId,
        channels: Vec<String>,
        remediation_attempted: bool,
    },

    #[error(
        "content view version {snapshot} is missing {} required channel(s); add them to content view '{view}' and publish a new version",
        .channels.len()
    )]
    SnapshotIncomplete {
        snapshot: SnapshotId,
        view: String,
        channels: Vec<String>,
    },

    #[error(
        "{} required channel(s) contain no packages; {}",
        .channels.len(),
        empty_channel_guidance(.default_view, .view, .lifecycle_environment)
    )]
    ChannelsEmpty {
        snapshot: SnapshotId,
        view: String,
        lifecycle_environment: String,
        default_view: bool,
        channels: Vec<String>,
    },
}

fn after_enabling(remediation_attempted: &bool) -> &'static str {
    if *remediation_attempted {
        " after enabling"
    } else {
        ""
    }
}

fn empty_channel_guidance(default_view: &bool, view: &str, lifecycle_environment: &str) -> String {
    if *default_view {
        "sync these channels".to_string()
    } else {
        format!(
            "sync these channels, publish a new version of content view '{}', then promote it to lifecycle environment '{}'",
            view, lifecycle_environment
        )
    }
}

impl RemoteStateError {
    #[must_use]
    pub fn layer(&self) -> Layer {
        match self {
            RemoteStateError::ChannelsNotEnabled { .. } => Layer::Organization,
            RemoteStateError::SnapshotIncomplete { .. } => Layer::ContentView,
            RemoteStateError::ChannelsEmpty { .. } => Layer::Content,
        }
    }

    #[must_use]
    pub fn channels(&self) -> &[String] {
        match self {
            RemoteStateError::ChannelsNotEnabled { channels, .. }
            | RemoteStateError::SnapshotIncomplete { channels, .. }
            | RemoteStateError::ChannelsEmpty { channels, .. } => channels,
        }
    }
}

// =============================================================================
// TRANSPORT ERRORS
// =============================================================================

/// A remote call could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("cannot reach {0}")]
    Unreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("unauthorized: check username and password")]
    Unauthorized,

    #[error("server returned {status} for {path}: {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },

    #[error("unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("command failed to run: {0}")]
    Command(String),
}

// =============================================================================
// REMEDIATION ERRORS
// =============================================================================

/// An enable action was refused for a reason other than "already enabled".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemediationError {
    #[error("enabling '{channel}' failed: {reason}")]
    EnableRejected { channel: String, reason: String },
}

// =============================================================================
// TOP-LEVEL ERROR
// =============================================================================

/// Any reason a readiness run did not reach `DONE`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadinessError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    HostState(#[from] HostStateError),

    #[error(transparent)]
    RemoteState(#[from] RemoteStateError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Remediation(#[from] RemediationError),
}

impl ReadinessError {
    /// Short class name, stable for machine consumers.
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            ReadinessError::Input(_) => "input",
            ReadinessError::HostState(_) => "host_state",
            ReadinessError::RemoteState(_) => "remote_state",
            ReadinessError::Transport(_) => "transport",
            ReadinessError::Remediation(_) => "remediation",
        }
    }

    /// Layer at which the run failed, if it got as far as the layers.
    #[must_use]
    pub fn layer(&self) -> Option<Layer> {
        match self {
            ReadinessError::RemoteState(e) => Some(e.layer()),
            ReadinessError::Remediation(_) => Some(Layer::Organization),
            _ => None,
        }
    }

    /// Every channel name the operator has to act on.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        match self {
            ReadinessError::RemoteState(e) => e.channels().to_vec(),
            ReadinessError::Remediation(RemediationError::EnableRejected { channel, .. }) => {
                vec![channel.clone()]
            }
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
