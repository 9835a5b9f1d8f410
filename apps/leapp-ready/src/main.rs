//! # leapp-ready
//!
//! Checks that a Satellite-managed RHEL 7 host has every repository a Leapp
//! upgrade to RHEL 8 needs, enabling missing ones when allowed.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a host against RHEL 8.8
//! leapp-ready --server satellite.example.com -u admin -p secret check -c web01.example.com -v 8.8
//!
//! # Same, machine-readable, without enabling anything
//! leapp-ready --json check -c web01.example.com -v 8.8 --no-remediate
//!
//! # Repositories a POWER9 host needs for 8.10 (no server needed)
//! leapp-ready channels -a ppc64le --sub-arch power9 -v 8.10
//! ```
//!
//! The exit code tells which layer failed; see [`leapp_ready::AppError`].

use clap::Parser;
use leapp_ready::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // LEAPP_READY_LOG_FORMAT=json enables machine-parseable logs.
    let log_format = std::env::var("LEAPP_READY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "leapp_ready=debug,leapp_ready_core=debug"
    } else {
        "leapp_ready=info,leapp_ready_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(class = e.class(), "{}", e);
        std::process::exit(e.exit_code());
    }
}
