//! # Release & Architecture Catalog
//!
//! The closed table of channels a RHEL 7 → RHEL 8 upgrade needs, per
//! platform. A platform is an architecture plus, where channel names differ
//! by CPU generation, a sub-architecture. Every lookup is an exhaustive
//! `match`, so adding a platform without channels does not compile.
//!
//! ## Channel naming
//!
//! Channel display names must match the server byte-for-byte. A name is the
//! stem plus, depending on [`ReleaseSlot`], nothing, the pinned pre-upgrade
//! release (`7Server`, `7.9`) or the requested target release.

use crate::error::InputError;
use crate::types::{Architecture, OsVersion, SubArchitecture, TargetRelease};
use serde::Serialize;
use std::fmt;

// =============================================================================
// PRE-UPGRADE VERSION PINS
// =============================================================================

/// The only major version that can be upgraded.
pub const SOURCE_MAJOR: u32 = 7;

/// Latest minor release of the source major. Pre-upgrade channels are pinned
/// to it, so hosts below it cannot satisfy the required set yet.
pub const LATEST_SOURCE: OsVersion = OsVersion::new(7, 9);

/// Rolling release qualifier of the pre-upgrade base channel.
pub const LEGACY_ROLLING_RELEASE: &str = "7Server";

/// Pinned release qualifier of the pre-upgrade base channel.
pub const LEGACY_PINNED_RELEASE: &str = "7.9";

// =============================================================================
// PLATFORM
// =============================================================================

/// A catalog row key: architecture refined by sub-architecture where needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    X86_64,
    Power8,
    Power9,
    S390x,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::X86_64,
        Platform::Power8,
        Platform::Power9,
        Platform::S390x,
    ];

    /// Combine an architecture with an optional sub-architecture.
    ///
    /// `ppc64le` without a sub-architecture is ambiguous; a sub-architecture on
    /// any other architecture is meaningless. Both are rejected.
    pub fn from_parts(
        arch: Architecture,
        sub: Option<SubArchitecture>,
    ) -> Result<Self, InputError> {
        match (arch, sub) {
            (Architecture::X86_64, None) => Ok(Platform::X86_64),
            (Architecture::S390x, None) => Ok(Platform::S390x),
            (Architecture::Ppc64le, Some(SubArchitecture::Power8)) => Ok(Platform::Power8),
            (Architecture::Ppc64le, Some(SubArchitecture::Power9)) => Ok(Platform::Power9),
            (Architecture::Ppc64le, None) => Err(InputError::AmbiguousSubArchitecture(arch)),
            (arch @ (Architecture::X86_64 | Architecture::S390x), Some(sub)) => {
                Err(InputError::SubArchitectureNotApplicable { arch, sub })
            }
        }
    }

    #[must_use]
    pub fn architecture(&self) -> Architecture {
        match self {
            Platform::X86_64 => Architecture::X86_64,
            Platform::Power8 | Platform::Power9 => Architecture::Ppc64le,
            Platform::S390x => Architecture::S390x,
        }
    }

    #[must_use]
    pub fn sub_architecture(&self) -> Option<SubArchitecture> {
        match self {
            Platform::Power8 => Some(SubArchitecture::Power8),
            Platform::Power9 => Some(SubArchitecture::Power9),
            Platform::X86_64 | Platform::S390x => None,
        }
    }

    /// The catalog rows for this platform, in enable order.
    #[must_use]
    pub fn channels(&self) -> &'static [ChannelTemplate] {
        match self {
            Platform::X86_64 => X86_64_CHANNELS,
            Platform::Power8 => POWER8_CHANNELS,
            Platform::Power9 => POWER9_CHANNELS,
            Platform::S390x => S390X_CHANNELS,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_architecture() {
            Some(sub) => write!(f, "{} ({})", self.architecture(), sub),
            None => write!(f, "{}", self.architecture()),
        }
    }
}

// =============================================================================
// CHANNEL TEMPLATES
// =============================================================================

/// Which release, if any, completes a channel's name and scopes its enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseSlot {
    /// Channel has no release (Extras).
    Unversioned,
    /// Pre-upgrade channel pinned to a fixed legacy qualifier.
    Legacy(&'static str),
    /// Post-upgrade channel, qualified by the requested target release.
    Target,
}

/// One catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelTemplate {
    /// Repository set the channel is enabled from.
    pub repository_set: &'static str,
    /// Display name without the release qualifier.
    pub stem: &'static str,
    pub release: ReleaseSlot,
}

const fn row(
    repository_set: &'static str,
    stem: &'static str,
    release: ReleaseSlot,
) -> ChannelTemplate {
    ChannelTemplate {
        repository_set,
        stem,
        release,
    }
}

const X86_64_CHANNELS: &[ChannelTemplate] = &[
    row(
        "Red Hat Enterprise Linux 7 Server (RPMs)",
        "Red Hat Enterprise Linux 7 Server RPMs x86_64",
        ReleaseSlot::Legacy(LEGACY_ROLLING_RELEASE),
    ),
    row(
        "Red Hat Enterprise Linux 7 Server (RPMs)",
        "Red Hat Enterprise Linux 7 Server RPMs x86_64",
        ReleaseSlot::Legacy(LEGACY_PINNED_RELEASE),
    ),
    row(
        "Red Hat Enterprise Linux 7 Server - Extras (RPMs)",
        "Red Hat Enterprise Linux 7 Server - Extras RPMs x86_64",
        ReleaseSlot::Unversioned,
    ),
    row(
        "Red Hat Enterprise Linux 8 for x86_64 - AppStream (RPMs)",
        "Red Hat Enterprise Linux 8 for x86_64 - AppStream RPMs",
        ReleaseSlot::Target,
    ),
    row(
        "Red Hat Enterprise Linux 8 for x86_64 - BaseOS (RPMs)",
        "Red Hat Enterprise Linux 8 for x86_64 - BaseOS RPMs",
        ReleaseSlot::Target,
    ),
];

const POWER8_CHANNELS: &[ChannelTemplate] = &[
    row(
        "Red Hat Enterprise Linux 7 for Power, little endian (RPMs)",
        "Red Hat Enterprise Linux 7 for Power, little endian RPMs ppc64le",
        ReleaseSlot::Legacy(LEGACY_ROLLING_RELEASE),
    ),
    row(
        "Red Hat Enterprise Linux 7 for Power, little endian (RPMs)",
        "Red Hat Enterprise Linux 7 for Power, little endian RPMs ppc64le",
        ReleaseSlot::Legacy(LEGACY_PINNED_RELEASE),
    ),
    row(
        "Red Hat Enterprise Linux 7 for Power, little endian - Extras (RPMs)",
        "Red Hat Enterprise Linux 7 for Power, little endian - Extras RPMs ppc64le",
        ReleaseSlot::Unversioned,
    ),
    row(
        "Red Hat Enterprise Linux 8 for Power, little endian - AppStream (RPMs)",
        "Red Hat Enterprise Linux 8 for Power, little endian - AppStream RPMs",
        ReleaseSlot::Target,
    ),
    row(
        "Red Hat Enterprise Linux 8 for Power, little endian - BaseOS (RPMs)",
        "Red Hat Enterprise Linux 8 for Power, little endian - BaseOS RPMs",
        ReleaseSlot::Target,
    ),
];

// POWER9 hosts run the alternative-architecture RHEL 7 build, which only
// ships a rolling base channel.
const POWER9_CHANNELS: &[ChannelTemplate] = &[
    row(
        "Red Hat Enterprise Linux for Power 9 (RPMs)",
        "Red Hat Enterprise Linux for Power 9 RPMs ppc64le",
        ReleaseSlot::Legacy(LEGACY_ROLLING_RELEASE),
    ),
    row(
        "Red Hat Enterprise Linux for Power 9 - Extras (RPMs)",
        "Red Hat Enterprise Linux for Power 9 - Extras RPMs ppc64le",
        ReleaseSlot::Unversioned,
    ),
    row(
        "Red Hat Enterprise Linux 8 for Power, little endian - AppStream (RPMs)",
        "Red Hat Enterprise Linux 8 for Power, little endian - AppStream RPMs",
        ReleaseSlot::Target,
    ),
    row(
        "Red Hat Enterprise Linux 8 for Power, little endian - BaseOS (RPMs)",
        "Red Hat Enterprise Linux 8 for Power, little endian - BaseOS RPMs",
        ReleaseSlot::Target,
    ),
];

const S390X_CHANNELS: &[ChannelTemplate] = &[
    row(
        "Red Hat Enterprise Linux 7 for System Z (RPMs)",
        "Red Hat Enterprise Linux 7 for System Z RPMs s390x",
        ReleaseSlot::Legacy(LEGACY_ROLLING_RELEASE),
    ),
    row(
        "Red Hat Enterprise Linux 7 for System Z (RPMs)",
        "Red Hat Enterprise Linux 7 for System Z RPMs s390x",
        ReleaseSlot::Legacy(LEGACY_PINNED_RELEASE),
    ),
    row(
        "Red Hat Enterprise Linux 7 for System Z - Extras (RPMs)",
        "Red Hat Enterprise Linux 7 for System Z - Extras RPMs s390x",
        ReleaseSlot::Unversioned,
    ),
    row(
        "Red Hat Enterprise Linux 8 for IBM z Systems - AppStream (RPMs)",
        "Red Hat Enterprise Linux 8 for IBM z Systems - AppStream RPMs",
        ReleaseSlot::Target,
    ),
    row(
        "Red Hat Enterprise Linux 8 for IBM z Systems - BaseOS (RPMs)",
        "Red Hat Enterprise Linux 8 for IBM z Systems - BaseOS RPMs",
        ReleaseSlot::Target,
    ),
];

impl ChannelTemplate {
    /// Release qualifier for this row under `target`, if the row has one.
    #[must_use]
    pub fn qualifier(&self, target: TargetRelease) -> Option<&'static str> {
        match self.release {
            ReleaseSlot::Unversioned => None,
            ReleaseSlot::Legacy(q) => Some(q),
            ReleaseSlot::Target => Some(target.as_str()),
        }
    }

    /// Exact display name under `target`.
    #[must_use]
    pub fn display_name(&self, target: TargetRelease) -> String {
        match self.qualifier(target) {
            Some(q) => format!("{} {}", self.stem, q),
            None => self.stem.to_string(),
        }
    }

    /// Whether the channel serves the post-upgrade system.
    #[must_use]
    pub fn is_target(&self) -> bool {
        matches!(self.release, ReleaseSlot::Target)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_has_channels() {
        for platform in Platform::ALL {
            assert!(!platform.channels().is_empty(), "{platform} has no rows");
        }
    }

    #[test]
    fn platform_round_trips_through_parts() {
        for platform in Platform::ALL {
            let rebuilt =
                Platform::from_parts(platform.architecture(), platform.sub_architecture());
            assert_eq!(rebuilt, Ok(platform));
        }
    }

    #[test]
    fn ppc64le_needs_generation() {
        assert_eq!(
            Platform::from_parts(Architecture::Ppc64le, None),
            Err(InputError::AmbiguousSubArchitecture(Architecture::Ppc64le))
        );
    }

    #[test]
    fn generation_rejected_off_power() {
        assert!(matches!(
            Platform::from_parts(Architecture::X86_64, Some(SubArchitecture::Power9)),
            Err(InputError::SubArchitectureNotApplicable { .. })
        ));
    }

    #[test]
    fn x86_64_names_match_server() {
        let names: Vec<String> = Platform::X86_64
            .channels()
            .iter()
            .map(|c| c.display_name(TargetRelease::Rhel8_6))
            .collect();
        assert_eq!(
            names,
            vec![
                "Red Hat Enterprise Linux 7 Server RPMs x86_64 7Server",
                "Red Hat Enterprise Linux 7 Server RPMs x86_64 7.9",
                "Red Hat Enterprise Linux 7 Server - Extras RPMs x86_64",
                "Red Hat Enterprise Linux 8 for x86_64 - AppStream RPMs 8.6",
                "Red Hat Enterprise Linux 8 for x86_64 - BaseOS RPMs 8.6",
            ]
        );
    }

    #[test]
    fn power_generations_differ() {
        assert_ne!(Platform::Power8.channels(), Platform::Power9.channels());
    }
}
