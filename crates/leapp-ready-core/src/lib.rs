//! # leapp-ready-core
//!
//! Repository-readiness decisions for RHEL 7 → RHEL 8 Leapp upgrades of
//! hosts managed by a Satellite (Foreman + Katello) server - THE LOGIC.
//!
//! A host may upgrade when every channel the upgrade needs is:
//! 1. enabled for its organization,
//! 2. part of the content view version it consumes,
//! 3. populated with packages.
//!
//! Missing organization channels can be enabled automatically; the other two
//! layers are reported with the exact channels to fix.
//!
//! ## Architectural Constraints
//!
//! - No network, no async runtime: remote calls go through the traits in
//!   [`source`]
//! - The channel catalog is a closed `match`, not a lookup table
//! - All run parameters live in an immutable [`RunContext`]
//! - Every failing branch returns a typed [`ReadinessError`]

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod checker;
pub mod context;
pub mod error;
pub mod host;
pub mod remediation;
pub mod resolver;
pub mod source;
pub mod types;
pub mod validate;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use catalog::{LATEST_SOURCE, Platform, SOURCE_MAJOR};
pub use checker::{ChannelCount, CheckOutcome, CheckState, ReadinessChecker};
pub use context::RunContext;
pub use error::{
    FactsGap, HostStateError, InputError, Layer, ReadinessError, RemediationError,
    RemoteStateError, TransportError,
};
pub use host::{ContentFacet, HostContext, HostRecord, HostWarning, SnapshotRef};
pub use remediation::{EnableReport, RemediationEnabler};
pub use resolver::{ChannelPhase, RequiredChannel, RequiredChannelSet, resolve, resolve_target};
pub use source::{
    ContentQuery, EnableAction, EnableOutcome, HostDirectory, Snapshot, SnapshotChannel,
};
pub use types::{
    Architecture, ChannelId, ContentAccess, OrganizationId, OsVersion, SnapshotId,
    SubArchitecture, TargetRelease,
};
pub use validate::{ReadinessFailure, ReadinessReport, Services, validate};
