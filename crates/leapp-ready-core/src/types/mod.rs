//! # Core Type Definitions
//!
//! This module contains the value types every component shares:
//! - Remote identifiers (`OrganizationId`, `SnapshotId`, `ChannelId`)
//! - Closed enumerations for the catalog dimensions (`Architecture`,
//!   `SubArchitecture`, `TargetRelease`)
//! - Host-reported facts (`OsVersion`, `ContentAccess`)
//!
//! Parsing is strict: anything outside the enumerations is an `InputError`
//! before any remote system is contacted.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// REMOTE IDENTIFIERS
// =============================================================================

/// Identifier of an organization (tenant) on the content-management server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub u64);

/// Identifier of a content snapshot (content view version).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub u64);

/// Identifier of a single channel (repository) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ARCHITECTURE
// =============================================================================

/// Base CPU architecture of a host, as the server names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "ppc64le")]
    Ppc64le,
    #[serde(rename = "s390x")]
    S390x,
}

impl Architecture {
    /// All supported architectures, in catalog order.
    pub const ALL: [Architecture; 3] = [
        Architecture::X86_64,
        Architecture::Ppc64le,
        Architecture::S390x,
    ];

    /// The architecture string used by the server and by `basearch`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86_64 => "x86_64",
            Architecture::Ppc64le => "ppc64le",
            Architecture::S390x => "s390x",
        }
    }

    /// Whether channel sets for this architecture differ by CPU generation.
    #[must_use]
    pub fn requires_sub_architecture(&self) -> bool {
        matches!(self, Architecture::Ppc64le)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(Architecture::X86_64),
            "ppc64le" => Ok(Architecture::Ppc64le),
            "s390x" => Ok(Architecture::S390x),
            other => Err(InputError::UnsupportedArchitecture(other.to_string())),
        }
    }
}

/// CPU generation refinement for architectures that need one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubArchitecture {
    Power8,
    Power9,
}

impl SubArchitecture {
    /// All sub-architectures.
    pub const ALL: [SubArchitecture; 2] = [SubArchitecture::Power8, SubArchitecture::Power9];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SubArchitecture::Power8 => "power8",
            SubArchitecture::Power9 => "power9",
        }
    }

    /// Detect the generation from a CPU model fact such as
    /// `"POWER9 (architected), altivec supported"`.
    #[must_use]
    pub fn from_cpu_model(model: &str) -> Option<Self> {
        let upper = model.to_ascii_uppercase();
        if upper.contains("POWER9") {
            Some(SubArchitecture::Power9)
        } else if upper.contains("POWER8") {
            Some(SubArchitecture::Power8)
        } else {
            None
        }
    }
}

impl fmt::Display for SubArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubArchitecture {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "power8" => Ok(SubArchitecture::Power8),
            "power9" => Ok(SubArchitecture::Power9),
            _ => Err(InputError::UnsupportedSubArchitecture(s.to_string())),
        }
    }
}

// =============================================================================
// TARGET RELEASE
// =============================================================================

/// A supported upgrade target. The allow-list is this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetRelease {
    #[serde(rename = "8.6")]
    Rhel8_6,
    #[serde(rename = "8.8")]
    Rhel8_8,
    #[serde(rename = "8.10")]
    Rhel8_10,
}

impl TargetRelease {
    /// Every supported target, oldest first.
    pub const ALL: [TargetRelease; 3] = [
        TargetRelease::Rhel8_6,
        TargetRelease::Rhel8_8,
        TargetRelease::Rhel8_10,
    ];

    /// The release string as it appears in channel names and `releasever`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetRelease::Rhel8_6 => "8.6",
            TargetRelease::Rhel8_8 => "8.8",
            TargetRelease::Rhel8_10 => "8.10",
        }
    }

    /// Comma-separated allow-list, for messages.
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TargetRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetRelease {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| InputError::UnsupportedRelease {
                requested: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

// =============================================================================
// HOST FACTS
// =============================================================================

/// Operating system version reported by a host (`distribution::version`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
}

impl OsVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `"7.9"`, `"7"` (minor 0) or `"7.9.2"` (patch ignored).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(m) => m.parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// How the host consumes content. Reported, never evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentAccess {
    SimpleContentAccess,
    Entitlement,
    Unknown,
}

impl ContentAccess {
    /// Map the server's `subscription_status_label`.
    #[must_use]
    pub fn from_status_label(label: Option<&str>) -> Self {
        match label {
            Some("Simple Content Access") => ContentAccess::SimpleContentAccess,
            Some("Valid") => ContentAccess::Entitlement,
            _ => ContentAccess::Unknown,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
