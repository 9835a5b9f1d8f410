//! # RepoSet Resolver
//!
//! Turns (architecture, sub-architecture, target release) into the ordered
//! set of channels a host needs. Pure: no I/O, so the whole catalog can be
//! checked without a server.
//!
//! Validation order is fixed: the release is checked first, then the
//! platform. An unsupported release never reaches a remote call.

use crate::catalog::{ChannelTemplate, Platform};
use crate::error::InputError;
use crate::types::{Architecture, SubArchitecture, TargetRelease};
use serde::Serialize;
use std::collections::BTreeSet;

// =============================================================================
// REQUIRED CHANNEL
// =============================================================================

/// Which side of the upgrade a channel serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPhase {
    /// Packages for the running (pre-upgrade) system.
    Source,
    /// Packages for the upgraded system.
    Target,
}

/// A resolved channel: its exact display name and everything needed to
/// enable it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredChannel {
    /// Display name, compared byte-for-byte with the server's names.
    pub name: String,
    /// Repository set that produces this channel when enabled.
    pub repository_set: String,
    /// `basearch` for the enable action.
    pub basearch: Architecture,
    /// `releasever` for the enable action; `None` for unversioned channels.
    pub release: Option<String>,
    pub phase: ChannelPhase,
}

impl RequiredChannel {
    fn from_template(template: &ChannelTemplate, arch: Architecture, target: TargetRelease) -> Self {
        Self {
            name: template.display_name(target),
            repository_set: template.repository_set.to_string(),
            basearch: arch,
            release: template.qualifier(target).map(str::to_string),
            phase: if template.is_target() {
                ChannelPhase::Target
            } else {
                ChannelPhase::Source
            },
        }
    }
}

// =============================================================================
// REQUIRED CHANNEL SET
// =============================================================================

/// Ordered, immutable required set for one run.
///
/// Order only matters for remediation (channels are enabled in this order);
/// membership tests treat the set as unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredChannelSet {
    platform: Platform,
    target: TargetRelease,
    channels: Vec<RequiredChannel>,
}

impl RequiredChannelSet {
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn target(&self) -> TargetRelease {
        self.target
    }

    #[must_use]
    pub fn channels(&self) -> &[RequiredChannel] {
        &self.channels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel names in resolution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.channels.iter().any(|c| c.name == name)
    }

    /// `required − present`, in resolution order.
    #[must_use]
    pub fn missing_from(&self, present: &BTreeSet<String>) -> Vec<&RequiredChannel> {
        self.channels
            .iter()
            .filter(|c| !present.contains(&c.name))
            .collect()
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve from raw strings, as received from a caller.
///
/// The release is validated before anything else.
pub fn resolve(
    architecture: Architecture,
    sub_architecture: Option<SubArchitecture>,
    target_release: &str,
) -> Result<RequiredChannelSet, InputError> {
    let target: TargetRelease = target_release.parse()?;
    resolve_target(architecture, sub_architecture, target)
}

/// Resolve with an already-validated release.
pub fn resolve_target(
    architecture: Architecture,
    sub_architecture: Option<SubArchitecture>,
    target: TargetRelease,
) -> Result<RequiredChannelSet, InputError> {
    let platform = Platform::from_parts(architecture, sub_architecture)?;
    Ok(resolve_platform(platform, target))
}

/// Resolve a platform that is already known to be valid.
#[must_use]
pub fn resolve_platform(platform: Platform, target: TargetRelease) -> RequiredChannelSet {
    let arch = platform.architecture();
    let channels = platform
        .channels()
        .iter()
        .map(|t| RequiredChannel::from_template(t, arch, target))
        .collect();
    RequiredChannelSet {
        platform,
        target,
        channels,
    }
}

// =============================================================================
// TESTS
// =============================================================================
