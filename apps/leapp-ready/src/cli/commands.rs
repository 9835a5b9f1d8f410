//! # CLI Command Implementations
//!
//! The report goes to stdout, as text or JSON; logs go to stderr.

use crate::client::SatelliteClient;
use crate::config::{EnableVia, Overrides, Settings};
use crate::error::AppError;
use crate::hammer::HammerEnabler;
use leapp_ready_core::{
    Architecture, ChannelPhase, ContentAccess, InputError, ReadinessError, ReadinessFailure,
    ReadinessReport, RequiredChannelSet, RunContext, Services, SubArchitecture, TargetRelease,
    resolve, validate,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json(value: &impl Serialize) -> Result<(), AppError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| AppError::Output(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn parse_sub_architecture(raw: Option<&str>) -> Result<Option<SubArchitecture>, InputError> {
    raw.map(str::parse).transpose()
}

fn phase_label(phase: ChannelPhase) -> &'static str {
    match phase {
        ChannelPhase::Source => "source",
        ChannelPhase::Target => "target",
    }
}

fn access_label(access: ContentAccess) -> &'static str {
    match access {
        ContentAccess::SimpleContentAccess => "simple content access",
        ContentAccess::Entitlement => "entitlement",
        ContentAccess::Unknown => "unknown",
    }
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Arguments of one `check` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub host: String,
    pub target: String,
    pub sub_arch: Option<String>,
    pub remediate: bool,
    pub strict_minor: bool,
}

impl CheckRequest {
    /// Validate the run parameters before anything touches the network.
    pub fn run_context(&self) -> Result<RunContext, InputError> {
        let sub = parse_sub_architecture(self.sub_arch.as_deref())?;
        Ok(RunContext::new(self.host.clone(), &self.target)?
            .with_sub_architecture(sub)
            .with_remediation(self.remediate)
            .with_strict_minor(self.strict_minor))
    }
}

/// Validate one host against a target release.
pub async fn cmd_check(
    request: &CheckRequest,
    config_path: Option<&Path>,
    overrides: &Overrides,
    json_mode: bool,
) -> Result<(), AppError> {
    let ctx = request.run_context()?;
    let settings = Settings::load(config_path, overrides)?;
    tracing::debug!(?settings, "resolved settings");

    let client = SatelliteClient::new(&settings)?;
    tracing::info!(server = client.base_url(), enable_via = ?settings.enable_via, "connecting");

    match run_check(&client, &settings, &ctx).await {
        Ok(report) => {
            if json_mode {
                print_json(&ready_json(&report))?;
            } else {
                print!("{}", render_report(&report));
            }
            Ok(())
        }
        Err(failure) => {
            if json_mode {
                print_json(&failure_json(&ctx, &failure))?;
            } else {
                print!("{}", render_failure(&ctx, &failure));
            }
            Err(failure.error.into())
        }
    }
}

/// Check the server status, then validate with the configured enable transport.
pub async fn run_check(
    client: &SatelliteClient,
    settings: &Settings,
    ctx: &RunContext,
) -> Result<ReadinessReport, ReadinessFailure> {
    client.check_status().await.map_err(ReadinessError::from)?;

    match settings.enable_via {
        EnableVia::Api => {
            let services = Services {
                hosts: client,
                content: client,
                enable: client,
            };
            validate(ctx, &services).await
        }
        EnableVia::Hammer => {
            let hammer = HammerEnabler::new(settings.hammer_path.clone());
            let services = Services {
                hosts: client,
                content: client,
                enable: &hammer,
            };
            validate(ctx, &services).await
        }
    }
}

/// JSON document for a host that is ready.
pub fn ready_json(report: &ReadinessReport) -> serde_json::Value {
    serde_json::json!({
        "status": "ready",
        "report": report,
    })
}

/// JSON document for a failed run.
pub fn failure_json(ctx: &RunContext, failure: &ReadinessFailure) -> serde_json::Value {
    let err = &failure.error;
    serde_json::json!({
        "status": "failed",
        "host": ctx.host(),
        "target": ctx.target(),
        "class": err.class(),
        "layer": err.layer(),
        "channels": err.channels(),
        "message": err.to_string(),
        "warnings": failure.warnings,
    })
}

/// Human-readable report for a host that is ready.
pub fn render_report(report: &ReadinessReport) -> String {
    let host = &report.host;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "READY: {} can upgrade to RHEL {}",
        host.name, report.target
    );
    let _ = writeln!(
        out,
        "  Host:           {} ({}, RHEL {})",
        host.name,
        report.required.platform(),
        host.os_version
    );
    let _ = writeln!(out, "  Organization:   {}", host.organization);
    let view_note = if host.snapshot.default_view {
        " [default view]"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "  Content view:   {} (version {}){}",
        host.snapshot.view_name, host.snapshot.id, view_note
    );
    let _ = writeln!(out, "  Lifecycle:      {}", host.lifecycle_environment);
    let _ = writeln!(out, "  Content access: {}", access_label(host.content_access));

    let trace: Vec<&str> = report.outcome.trace.iter().map(|s| s.as_str()).collect();
    let _ = writeln!(out, "  Checks:         {}", trace.join(" -> "));

    if let Some(remediation) = &report.outcome.remediation {
        for name in &remediation.enabled {
            let _ = writeln!(out, "  Enabled:        {}", name);
        }
        for name in &remediation.already_enabled {
            let _ = writeln!(out, "  Already on:     {}", name);
        }
    }

    let _ = writeln!(out, "  Repositories:");
    for count in &report.outcome.channel_counts {
        let _ = writeln!(out, "    {:>7} packages  {}", count.packages, count.name);
    }
    for name in &report.outcome.uncounted {
        let _ = writeln!(out, "    {:>7}           {} (not in default view)", "-", name);
    }

    for warning in &report.warnings {
        let _ = writeln!(out, "  Warning: {}", warning);
    }
    out
}

/// Human-readable summary of a failed run.
pub fn render_failure(ctx: &RunContext, failure: &ReadinessFailure) -> String {
    let err = &failure.error;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "NOT READY: {} -> RHEL {} ({})",
        ctx.host(),
        ctx.target(),
        err.class()
    );
    if let Some(layer) = err.layer() {
        let _ = writeln!(out, "  Layer: {}", layer);
    }
    let _ = writeln!(out, "  {}", err);
    let channels = err.channels();
    if !channels.is_empty() {
        let _ = writeln!(out, "  Repositories:");
        for name in channels {
            let _ = writeln!(out, "    - {}", name);
        }
    }
    for warning in &failure.warnings {
        let _ = writeln!(out, "  Warning: {}", warning);
    }
    out
}

// =============================================================================
// CHANNELS COMMAND
// =============================================================================

/// Print the repositories a platform needs, without contacting a server.
pub fn cmd_channels(
    arch: &str,
    sub_arch: Option<&str>,
    target: &str,
    json_mode: bool,
) -> Result<(), AppError> {
    let arch: Architecture = arch.parse()?;
    let sub = parse_sub_architecture(sub_arch)?;
    let set = resolve(arch, sub, target)?;

    if json_mode {
        return print_json(&set);
    }
    print!("{}", render_channels(&set));
    Ok(())
}

pub fn render_channels(set: &RequiredChannelSet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} -> RHEL {}: {} repositories",
        set.platform(),
        set.target(),
        set.len()
    );
    for channel in set.channels() {
        let _ = writeln!(out, "  {:<6}  {}", phase_label(channel.phase), channel.name);
    }
    out
}

// =============================================================================
// RELEASES COMMAND
// =============================================================================

/// Print the supported target releases.
pub fn cmd_releases(json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        return print_json(&TargetRelease::ALL);
    }
    for release in TargetRelease::ALL {
        println!("{}", release);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
