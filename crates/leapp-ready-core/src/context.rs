//! # Run Context
//!
//! Everything a run is asked to do, fixed at construction. Components read it
//! and never change it; there is no module-level state.

use crate::error::InputError;
use crate::types::{SubArchitecture, TargetRelease};
use serde::Serialize;

/// Immutable parameters of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunContext {
    host: String,
    target: TargetRelease,
    sub_architecture: Option<SubArchitecture>,
    remediate: bool,
    strict_minor: bool,
}

impl RunContext {
    /// Build a context for `host` upgrading to `target_release`.
    ///
    /// Fails with `InputError::UnsupportedRelease` before any remote call can
    /// be made. Remediation is on and the minor-version check is a warning by
    /// default.
    pub fn new(host: impl Into<String>, target_release: &str) -> Result<Self, InputError> {
        Ok(Self {
            host: host.into(),
            target: target_release.parse()?,
            sub_architecture: None,
            remediate: true,
            strict_minor: false,
        })
    }

    /// Use this CPU generation instead of detecting it from facts.
    #[must_use]
    pub fn with_sub_architecture(mut self, sub: Option<SubArchitecture>) -> Self {
        self.sub_architecture = sub;
        self
    }

    /// Report missing organization channels instead of enabling them.
    #[must_use]
    pub fn with_remediation(mut self, remediate: bool) -> Self {
        self.remediate = remediate;
        self
    }

    /// Treat an outdated minor version as a failure.
    #[must_use]
    pub fn with_strict_minor(mut self, strict: bool) -> Self {
        self.strict_minor = strict;
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn target(&self) -> TargetRelease {
        self.target
    }

    #[must_use]
    pub fn sub_architecture(&self) -> Option<SubArchitecture> {
        self.sub_architecture
    }

    #[must_use]
    pub fn remediate(&self) -> bool {
        self.remediate
    }

    #[must_use]
    pub fn strict_minor(&self) -> bool {
        self.strict_minor
    }
}
