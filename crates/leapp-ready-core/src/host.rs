//! # Host Context Resolver
//!
//! Reads the facts a readiness run needs out of a raw host record:
//! architecture, organization, content view version, lifecycle environment
//! and the running OS version.
//!
//! Failures are `HostStateError`s (the host must be fixed) except an
//! unrecognised architecture string, which is an `InputError`. A host below
//! the latest source minor release is a warning unless the run is strict.

use crate::catalog::{LATEST_SOURCE, SOURCE_MAJOR};
use crate::context::RunContext;
use crate::error::{FactsGap, HostStateError, ReadinessError};
use crate::source::HostDirectory;
use crate::types::{
    Architecture, ContentAccess, OrganizationId, OsVersion, SnapshotId, SubArchitecture,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fact carrying the running OS version.
pub const VERSION_FACT: &str = "distribution::version";

/// Facts that may name the CPU model, checked in order.
pub const CPU_MODEL_FACTS: [&str; 3] = ["lscpu.model_name", "cpu.model", "lscpu.model"];

/// Name the server gives every organization's unversioned default view.
pub const DEFAULT_VIEW_NAME: &str = "Default Organization View";

// =============================================================================
// RAW RECORD
// =============================================================================

/// Content facet of a host record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFacet {
    #[serde(default)]
    pub content_view_id: Option<u64>,
    #[serde(default)]
    pub content_view_name: Option<String>,
    #[serde(default)]
    pub content_view_version_id: Option<u64>,
    #[serde(default)]
    pub content_view_default: Option<bool>,
    #[serde(default)]
    pub lifecycle_environment_name: Option<String>,
}

/// A host as returned by the host lookup. Only the fields the core reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub name: String,
    #[serde(default)]
    pub architecture_name: Option<String>,
    #[serde(default)]
    pub organization_id: Option<u64>,
    #[serde(default)]
    pub content_facet_attributes: Option<ContentFacet>,
    #[serde(default)]
    pub lifecycle_environment_name: Option<String>,
    #[serde(default)]
    pub subscription_status_label: Option<String>,
    /// Flattened facts. `None` or empty means the host never reported any.
    #[serde(default)]
    pub facts: Option<BTreeMap<String, String>>,
}

// =============================================================================
// HOST CONTEXT
// =============================================================================

/// The content view version a host consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRef {
    pub id: SnapshotId,
    pub view_name: String,
    /// Unversioned default organization view.
    pub default_view: bool,
}

/// Facts about the host, derived once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostContext {
    pub name: String,
    pub architecture: Architecture,
    pub sub_architecture: Option<SubArchitecture>,
    pub organization: OrganizationId,
    pub snapshot: SnapshotRef,
    pub lifecycle_environment: String,
    pub os_version: OsVersion,
    pub content_access: ContentAccess,
}

/// Non-fatal findings about the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostWarning {
    /// Pre-upgrade channels are pinned to the latest minor; this host is older.
    OutdatedMinor {
        current: OsVersion,
        latest: OsVersion,
    },
    /// The requested CPU generation disagrees with the host's facts.
    SubArchitectureOverride {
        requested: SubArchitecture,
        detected: SubArchitecture,
    },
}

impl fmt::Display for HostWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostWarning::OutdatedMinor { current, latest } => write!(
                f,
                "host runs RHEL {current}; update to {latest} before upgrading"
            ),
            HostWarning::SubArchitectureOverride {
                requested,
                detected,
            } => write!(
                f,
                "requested {requested} but host facts report {detected}; using {requested}"
            ),
        }
    }
}

/// A resolved host and what was noticed along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    pub context: HostContext,
    pub warnings: Vec<HostWarning>,
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Look the host up and derive its context.
pub async fn resolve_host<D: HostDirectory>(
    directory: &D,
    ctx: &RunContext,
) -> Result<ResolvedHost, ReadinessError> {
    let record = directory
        .host(ctx.host())
        .await?
        .ok_or_else(|| HostStateError::HostNotFound(ctx.host().to_string()))?;
    from_record(&record, ctx)
}

/// Derive a host context from a record already in hand.
pub fn from_record(record: &HostRecord, ctx: &RunContext) -> Result<ResolvedHost, ReadinessError> {
    let host = record.name.clone();
    let mut warnings = Vec::new();

    let architecture: Architecture = match record.architecture_name.as_deref() {
        Some(raw) if !raw.is_empty() => raw.parse()?,
        _ => return Err(HostStateError::ArchitectureUnknown(host).into()),
    };

    let facts = match &record.facts {
        Some(facts) if !facts.is_empty() => facts,
        _ => {
            return Err(HostStateError::FactsMissing {
                host,
                gap: FactsGap::NeverReported,
            }
            .into());
        }
    };

    let raw_version = facts.get(VERSION_FACT).ok_or_else(|| HostStateError::FactsMissing {
        host: host.clone(),
        gap: FactsGap::VersionKeyAbsent,
    })?;
    let os_version =
        OsVersion::parse(raw_version).ok_or_else(|| HostStateError::MalformedVersion {
            host: host.clone(),
            value: raw_version.clone(),
        })?;

    if os_version.major != SOURCE_MAJOR {
        return Err(HostStateError::UnsupportedMajorVersion {
            host,
            found: os_version.major,
            supported: SOURCE_MAJOR,
        }
        .into());
    }
    if os_version < LATEST_SOURCE {
        if ctx.strict_minor() {
            return Err(HostStateError::OutdatedMinor {
                host,
                current: os_version,
                latest: LATEST_SOURCE,
            }
            .into());
        }
        tracing::warn!(
            host = %host,
            current = %os_version,
            latest = %LATEST_SOURCE,
            "host is not on the latest minor release"
        );
        warnings.push(HostWarning::OutdatedMinor {
            current: os_version,
            latest: LATEST_SOURCE,
        });
    }

    let sub_architecture = pick_sub_architecture(architecture, ctx, facts, &mut warnings);

    let facet = record
        .content_facet_attributes
        .as_ref()
        .ok_or_else(|| HostStateError::NotContentHost(host.clone()))?;
    let organization = record
        .organization_id
        .map(OrganizationId)
        .ok_or_else(|| HostStateError::NotContentHost(host.clone()))?;
    let snapshot_id = facet
        .content_view_version_id
        .map(SnapshotId)
        .ok_or_else(|| HostStateError::NotContentHost(host.clone()))?;
    let view_name = facet
        .content_view_name
        .clone()
        .unwrap_or_else(|| DEFAULT_VIEW_NAME.to_string());
    let default_view = facet
        .content_view_default
        .unwrap_or(view_name == DEFAULT_VIEW_NAME);

    let lifecycle_environment = facet
        .lifecycle_environment_name
        .clone()
        .or_else(|| record.lifecycle_environment_name.clone())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(ResolvedHost {
        context: HostContext {
            name: host,
            architecture,
            sub_architecture,
            organization,
            snapshot: SnapshotRef {
                id: snapshot_id,
                view_name,
                default_view,
            },
            lifecycle_environment,
            os_version,
            content_access: ContentAccess::from_status_label(
                record.subscription_status_label.as_deref(),
            ),
        },
        warnings,
    })
}

/// Explicit request wins over detection; detection only runs where the
/// architecture has generations.
fn pick_sub_architecture(
    architecture: Architecture,
    ctx: &RunContext,
    facts: &BTreeMap<String, String>,
    warnings: &mut Vec<HostWarning>,
) -> Option<SubArchitecture> {
    let detected = if architecture.requires_sub_architecture() {
        CPU_MODEL_FACTS
            .iter()
            .filter_map(|key| facts.get(*key))
            .find_map(|model| SubArchitecture::from_cpu_model(model))
    } else {
        None
    };

    match (ctx.sub_architecture(), detected) {
        (Some(requested), Some(detected)) if requested != detected => {
            warnings.push(HostWarning::SubArchitectureOverride {
                requested,
                detected,
            });
            Some(requested)
        }
        (Some(requested), _) => Some(requested),
        (None, detected) => detected,
    }
}

// =============================================================================
// TESTS
// =============================================================================
