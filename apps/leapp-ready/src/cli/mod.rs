//! # leapp-ready CLI Module
//!
//! ## Available Commands
//!
//! - `check` - Validate one host against a target release
//! - `channels` - Print the channels a platform needs (no network)
//! - `releases` - Print the supported target releases

mod commands;

use crate::config::{EnableVia, Overrides};
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// leapp-ready - Leapp repository readiness for Satellite hosts
///
/// Checks that every repository a RHEL 7 host needs for a Leapp upgrade is
/// enabled, published in its content view and synced.
#[derive(Parser, Debug)]
#[command(name = "leapp-ready")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Satellite server URL or host name
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// API user name
    #[arg(short = 'u', long, global = true)]
    pub username: Option<String>,

    /// API password
    #[arg(short = 'p', long, global = true)]
    pub password: Option<String>,

    /// CA bundle used to verify the server certificate
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a host's repositories are ready for the upgrade
    Check {
        /// Host name as registered on the server
        #[arg(short = 'c', long = "host")]
        host: String,

        /// Target RHEL 8 release (e.g. 8.6)
        #[arg(short = 'v', long = "target")]
        target: String,

        /// POWER generation for ppc64le hosts (power8, power9)
        #[arg(long)]
        sub_arch: Option<String>,

        /// Report missing repositories instead of enabling them
        #[arg(long)]
        no_remediate: bool,

        /// Fail instead of warn when the host is below the latest RHEL 7 minor
        #[arg(long)]
        strict_minor: bool,

        /// How repositories are enabled
        #[arg(long, value_enum)]
        enable_via: Option<EnableVia>,
    },

    /// Print the repositories a platform needs for a target release
    Channels {
        /// Architecture (x86_64, ppc64le, s390x)
        #[arg(short = 'a', long)]
        arch: String,

        /// POWER generation for ppc64le (power8, power9)
        #[arg(long)]
        sub_arch: Option<String>,

        /// Target RHEL 8 release (e.g. 8.6)
        #[arg(short = 'v', long = "target")]
        target: String,
    },

    /// Print the supported target releases
    Releases,
}

impl Cli {
    /// Connection values given on the command line.
    pub fn overrides(&self) -> Overrides {
        let enable_via = match &self.command {
            Commands::Check { enable_via, .. } => *enable_via,
            _ => None,
        };
        Overrides {
            server: self.server.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            ca_cert: self.ca_cert.clone(),
            timeout_secs: self.timeout,
            enable_via,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let json = cli.json;
    let overrides = cli.overrides();

    match cli.command {
        Commands::Check {
            host,
            target,
            sub_arch,
            no_remediate,
            strict_minor,
            enable_via: _,
        } => {
            let request = CheckRequest {
                host,
                target,
                sub_arch,
                remediate: !no_remediate,
                strict_minor,
            };
            cmd_check(&request, cli.config.as_deref(), &overrides, json).await
        }
        Commands::Channels {
            arch,
            sub_arch,
            target,
        } => cmd_channels(&arch, sub_arch.as_deref(), &target, json),
        Commands::Releases => cmd_releases(json),
    }
}

// =============================================================================
// TESTS
// =============================================================================
