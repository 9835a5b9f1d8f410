//! # Remote Service Interfaces
//!
//! The core never talks to a network or spawns a process. Everything it
//! needs from the content-management server comes through these traits;
//! `apps/leapp-ready` implements them over the Satellite REST API and the
//! `hammer` command line.
//!
//! Calls are awaited one at a time. Implementations bound each call with a
//! timeout and report failures as [`TransportError`]; they never retry.

use crate::error::TransportError;
use crate::host::HostRecord;
use crate::resolver::RequiredChannel;
use crate::types::{ChannelId, OrganizationId, SnapshotId};
use serde::Serialize;
use std::collections::BTreeSet;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A member channel of a content snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotChannel {
    pub id: ChannelId,
    pub name: String,
}

/// A content view version as the host consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    /// Name of the content view this version was published from.
    pub parent_view: String,
    pub channels: Vec<SnapshotChannel>,
}

impl Snapshot {
    /// Member channel names.
    #[must_use]
    pub fn channel_names(&self) -> BTreeSet<String> {
        self.channels.iter().map(|c| c.name.clone()).collect()
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Look up a host by name or id.
#[allow(async_fn_in_trait)]
pub trait HostDirectory {
    /// `Ok(None)` when the server does not know the host.
    async fn host(&self, identifier: &str) -> Result<Option<HostRecord>, TransportError>;
}

/// Read-only content queries used by the readiness layers.
#[allow(async_fn_in_trait)]
pub trait ContentQuery {
    /// Names of every channel enabled for the organization. Read fresh on
    /// every call.
    async fn organization_channels(
        &self,
        organization: OrganizationId,
    ) -> Result<BTreeSet<String>, TransportError>;

    async fn snapshot(&self, id: SnapshotId) -> Result<Snapshot, TransportError>;

    /// Number of packages (RPMs) in one channel.
    async fn channel_package_count(&self, id: ChannelId) -> Result<u64, TransportError>;
}

// =============================================================================
// ENABLE ACTION
// =============================================================================

/// Result of one enable action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnableOutcome {
    Enabled,
    /// The server reported a conflict because the channel is already on.
    AlreadyEnabled,
    /// Any other refusal.
    Rejected(String),
}

/// Enable one channel for an organization.
///
/// The channel carries its repository set, `basearch` and `releasever`; how
/// the action travels (REST call, command line) is the implementor's choice.
#[allow(async_fn_in_trait)]
pub trait EnableAction {
    async fn enable_channel(
        &self,
        organization: OrganizationId,
        channel: &RequiredChannel,
    ) -> Result<EnableOutcome, TransportError>;
}
