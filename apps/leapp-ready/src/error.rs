//! # Application Errors
//!
//! Wraps every failure the binary can hit and maps it to a process exit code.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | host is ready (`DONE`) |
//! | 1 | configuration or local setup problem |
//! | 2 | bad input (release, architecture, CPU generation) |
//! | 3 | the host itself must be fixed |
//! | 4 | server-side content must be fixed |
//! | 5 | the server could not be reached or answered badly |
//! | 6 | enabling a channel was refused |

use crate::client::SetupError;
use crate::config::ConfigError;
use leapp_ready_core::{InputError, ReadinessError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error("cannot render output: {0}")]
    Output(String),
}

impl From<InputError> for AppError {
    fn from(e: InputError) -> Self {
        AppError::Readiness(ReadinessError::Input(e))
    }
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::Setup(_) | AppError::Output(_) => 1,
            AppError::Readiness(e) => match e {
                ReadinessError::Input(_) => 2,
                ReadinessError::HostState(_) => 3,
                ReadinessError::RemoteState(_) => 4,
                ReadinessError::Transport(_) => 5,
                ReadinessError::Remediation(_) => 6,
            },
        }
    }

    /// Short machine-readable class, matching `ReadinessError::class`.
    pub fn class(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Setup(_) => "setup",
            AppError::Output(_) => "output",
            AppError::Readiness(e) => e.class(),
        }
    }
}
