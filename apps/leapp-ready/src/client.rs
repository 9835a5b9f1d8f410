//! # Satellite HTTP Client
//!
//! Implements the core's service traits over the Satellite (Foreman +
//! Katello) REST API.
//!
//! | Trait method | Endpoint |
//! |--------------|----------|
//! | `host` | `GET /api/hosts/:name` |
//! | `organization_channels` | `GET /katello/api/organizations/:id/repositories` |
//! | `snapshot` | `GET /katello/api/content_view_versions/:id` |
//! | `channel_package_count` | `GET /katello/api/repositories/:id` |
//! | `enable_channel` | `GET /katello/api/repository_sets` + `PUT .../:id/enable` |
//!
//! Every request uses basic authentication and the configured timeout.
//! Nothing is retried.

use crate::config::Settings;
use leapp_ready_core::{
    ChannelId, ContentFacet, ContentQuery, EnableAction, EnableOutcome, HostDirectory, HostRecord,
    OrganizationId, RequiredChannel, Snapshot, SnapshotChannel, SnapshotId, TransportError,
};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

/// Longest server message kept in an error.
const MAX_MESSAGE_LEN: usize = 300;

/// Errors building the client, before any request is made.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("cannot use CA certificate {}: {reason}", path.display())]
    CaCert { path: PathBuf, reason: String },

    #[error("invalid server URL '{0}'")]
    BadUrl(String),

    #[error("cannot build HTTP client: {0}")]
    Build(String),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct NamedRepository {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ContentViewRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct VersionRepository {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ContentViewVersion {
    id: u64,
    #[serde(default)]
    content_view: Option<ContentViewRef>,
    #[serde(default)]
    repositories: Vec<VersionRepository>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentCounts {
    #[serde(default)]
    rpm: u64,
}

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(default)]
    content_counts: ContentCounts,
}

#[derive(Debug, Deserialize)]
struct RepositorySet {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireHost {
    name: String,
    #[serde(default)]
    architecture_name: Option<String>,
    #[serde(default)]
    organization_id: Option<u64>,
    #[serde(default)]
    content_facet_attributes: Option<ContentFacet>,
    #[serde(default)]
    lifecycle_environment_name: Option<String>,
    #[serde(default)]
    subscription_status_label: Option<String>,
    #[serde(default)]
    facts: Option<serde_json::Map<String, Value>>,
}

impl From<WireHost> for HostRecord {
    fn from(wire: WireHost) -> Self {
        // Facts arrive as JSON scalars; the core only reads strings.
        let facts = wire.facts.map(|map| {
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| match v {
                    Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect::<BTreeMap<_, _>>()
        });
        HostRecord {
            name: wire.name,
            architecture_name: wire.architecture_name,
            organization_id: wire.organization_id,
            content_facet_attributes: wire.content_facet_attributes,
            lifecycle_environment_name: wire.lifecycle_environment_name,
            subscription_status_label: wire.subscription_status_label,
            facts,
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for one Satellite server.
#[derive(Clone)]
pub struct SatelliteClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
}

impl SatelliteClient {
    /// Build a client from resolved settings.
    pub fn new(settings: &Settings) -> Result<Self, SetupError> {
        let base_url = Url::parse(&settings.server)
            .map_err(|_| SetupError::BadUrl(settings.server.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(SetupError::BadUrl(settings.server.clone()));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .user_agent(concat!("leapp-ready/", env!("CARGO_PKG_VERSION")));

        if let Some(path) = &settings.ca_cert {
            let pem = std::fs::read(path).map_err(|e| SetupError::CaCert {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| SetupError::CaCert {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(|e| SetupError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build a URL from path segments; each segment is percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build an authenticated request.
    fn request(&self, method: Method, segments: &[&str]) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(segments))
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and classify connection failures.
    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<reqwest::Response, TransportError> {
        tracing::debug!(path, "request");
        req.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(path.to_string())
            } else {
                TransportError::Unreachable(format!("{}: {e}", self.base_url))
            }
        })
    }

    /// Check status codes and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        path: &str,
    ) -> Result<T, TransportError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                message: error_message(&body),
            });
        }
        resp.json::<T>().await.map_err(|e| TransportError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let path = format!("/{}", segments.join("/"));
        let req = self.request(Method::GET, segments).query(query);
        let resp = self.send(req, &path).await?;
        self.handle_response(resp, &path).await
    }

    /// GET /api/status: fail fast if the server is unreachable or refuses
    /// the credentials.
    pub async fn check_status(&self) -> Result<(), TransportError> {
        let _: Value = self.get_json(&["api", "status"], &[]).await?;
        Ok(())
    }

    /// Find a repository set id by exact name within an organization.
    async fn repository_set_id(
        &self,
        organization: OrganizationId,
        name: &str,
    ) -> Result<Option<u64>, TransportError> {
        let page: Page<RepositorySet> = self
            .get_json(
                &["katello", "api", "repository_sets"],
                &[
                    ("organization_id", organization.to_string()),
                    ("name", name.to_string()),
                    ("full_result", "true".to_string()),
                ],
            )
            .await?;
        Ok(page.results.into_iter().find(|s| s.name == name).map(|s| s.id))
    }
}

impl HostDirectory for SatelliteClient {
    async fn host(&self, identifier: &str) -> Result<Option<HostRecord>, TransportError> {
        let segments = ["api", "hosts", identifier];
        let path = format!("/api/hosts/{identifier}");
        let resp = self.send(self.request(Method::GET, &segments), &path).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let wire: WireHost = self.handle_response(resp, &path).await?;
        Ok(Some(wire.into()))
    }
}

impl ContentQuery for SatelliteClient {
    async fn organization_channels(
        &self,
        organization: OrganizationId,
    ) -> Result<BTreeSet<String>, TransportError> {
        let id = organization.to_string();
        let page: Page<NamedRepository> = self
            .get_json(
                &["katello", "api", "organizations", &id, "repositories"],
                &[("full_result", "true".to_string())],
            )
            .await?;
        Ok(page.results.into_iter().map(|r| r.name).collect())
    }

    async fn snapshot(&self, id: SnapshotId) -> Result<Snapshot, TransportError> {
        let raw_id = id.to_string();
        let version: ContentViewVersion = self
            .get_json(&["katello", "api", "content_view_versions", &raw_id], &[])
            .await?;
        Ok(Snapshot {
            id: SnapshotId(version.id),
            parent_view: version.content_view.map(|v| v.name).unwrap_or_default(),
            channels: version
                .repositories
                .into_iter()
                .map(|r| SnapshotChannel {
                    id: ChannelId(r.id),
                    name: r.name,
                })
                .collect(),
        })
    }

    async fn channel_package_count(&self, id: ChannelId) -> Result<u64, TransportError> {
        let raw_id = id.to_string();
        let repo: Repository = self
            .get_json(&["katello", "api", "repositories", &raw_id], &[])
            .await?;
        Ok(repo.content_counts.rpm)
    }
}

impl EnableAction for SatelliteClient {
    async fn enable_channel(
        &self,
        organization: OrganizationId,
        channel: &RequiredChannel,
    ) -> Result<EnableOutcome, TransportError> {
        let Some(set_id) = self
            .repository_set_id(organization, &channel.repository_set)
            .await?
        else {
            return Ok(EnableOutcome::Rejected(format!(
                "repository set '{}' not available to organization {}",
                channel.repository_set, organization
            )));
        };

        let raw_id = set_id.to_string();
        let segments = ["katello", "api", "repository_sets", raw_id.as_str(), "enable"];
        let path = format!("/{}", segments.join("/"));
        let mut body = serde_json::json!({
            "organization_id": organization.0,
            "basearch": channel.basearch.as_str(),
        });
        if let Some(release) = &channel.release {
            body["releasever"] = Value::String(release.clone());
        }

        let resp = self
            .send(self.request(Method::PUT, &segments).json(&body), &path)
            .await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::Unauthorized);
        }
        if status.is_success() {
            return Ok(EnableOutcome::Enabled);
        }
        let message = error_message(&resp.text().await.unwrap_or_default());
        if status == StatusCode::CONFLICT || is_already_enabled(&message) {
            return Ok(EnableOutcome::AlreadyEnabled);
        }
        Ok(EnableOutcome::Rejected(format!(
            "{} {}",
            status.as_u16(),
            message
        )))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Whether a server or command message reports a channel as already on.
pub fn is_already_enabled(message: &str) -> bool {
    message.to_ascii_lowercase().contains("already enabled")
}

/// Pull the human message out of a Foreman/Katello error body.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| {
            v.get("displayMessage")
                .or_else(|| v.get("error").and_then(|e| e.get("message")))
                .or_else(|| v.get("message"))
        })
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string());
    message.chars().take(MAX_MESSAGE_LEN).collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_display_message() {
        let body = r#"{"displayMessage":"The repository is already enabled","errors":["x"]}"#;
        assert_eq!(error_message(body), "The repository is already enabled");
        assert!(is_already_enabled(&error_message(body)));
    }

    #[test]
    fn error_message_nested_and_plain() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Permission denied"}}"#),
            "Permission denied"
        );
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn wire_host_flattens_facts() {
        let json = serde_json::json!({
            "name": "db01",
            "architecture_name": "s390x",
            "organization_id": 3,
            "facts": {
                "distribution::version": "7.9",
                "cpu.cpu_socket(s)": 2,
                "virt::is_guest": true,
                "dmi::bios::vendor": null
            }
        });
        let wire: WireHost = serde_json::from_value(json).expect("wire host");
        let record = HostRecord::from(wire);
        let facts = record.facts.expect("facts");
        assert_eq!(facts.get("distribution::version").map(String::as_str), Some("7.9"));
        assert_eq!(facts.get("cpu.cpu_socket(s)").map(String::as_str), Some("2"));
        assert_eq!(facts.get("virt::is_guest").map(String::as_str), Some("true"));
        assert!(!facts.contains_key("dmi::bios::vendor"));
    }
}
