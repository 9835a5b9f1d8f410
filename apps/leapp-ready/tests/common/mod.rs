//! Fake Satellite REST API on a local port, for the HTTP client tests.

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use leapp_ready::{EnableVia, Settings};
use leapp_ready_core::{Architecture, RequiredChannelSet, resolve};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HOST: &str = "web01.example.com";
pub const ORG: u64 = 1;
pub const SNAPSHOT: u64 = 22;
pub const VIEW: &str = "RHEL7-Leapp";
pub const USER: &str = "admin";
pub const PASSWORD: &str = "changeme";

/// Server-side state shared with the handlers.
pub struct FakeApi {
    pub required: RequiredChannelSet,
    pub enabled: Mutex<BTreeSet<String>>,
    /// Repository set name → id.
    pub sets: BTreeMap<String, u64>,
    /// (set id, releasever) → channel name produced by enabling.
    pub produces: BTreeMap<(u64, Option<String>), String>,
    /// Repository id → package count.
    pub counts: Mutex<BTreeMap<u64, u64>>,
    /// Set ids that answer 409.
    pub conflicts: Mutex<BTreeSet<u64>>,
    pub enable_bodies: Mutex<Vec<Value>>,
    pub deny_all: AtomicBool,
    pub status_delay: Mutex<Option<Duration>>,
    pub host_json: Mutex<Value>,
}

impl FakeApi {
    /// A server where x86_64 / 8.6 is fully enabled, published and synced.
    pub fn ready() -> Arc<Self> {
        let required = resolve(Architecture::X86_64, None, "8.6").expect("x86_64 8.6");

        let mut sets = BTreeMap::new();
        let mut produces = BTreeMap::new();
        for channel in required.channels() {
            let next = 500 + sets.len() as u64;
            let id = *sets.entry(channel.repository_set.clone()).or_insert(next);
            produces.insert((id, channel.release.clone()), channel.name.clone());
        }
        let counts = (0..required.len() as u64).map(|i| (100 + i, 2400)).collect();
        let enabled = required.names().iter().map(|n| n.to_string()).collect();

        Arc::new(Self {
            required,
            enabled: Mutex::new(enabled),
            sets,
            produces,
            counts: Mutex::new(counts),
            conflicts: Mutex::new(BTreeSet::new()),
            enable_bodies: Mutex::new(Vec::new()),
            deny_all: AtomicBool::new(false),
            status_delay: Mutex::new(None),
            host_json: Mutex::new(host_json("x86_64", "7.9")),
        })
    }

    pub fn disable(&self, name: &str) {
        self.enabled.lock().unwrap().remove(name);
    }

    pub fn set_id(&self, repository_set: &str) -> u64 {
        self.sets[repository_set]
    }
}

pub fn host_json(arch: &str, version: &str) -> Value {
    json!({
        "id": 17,
        "name": HOST,
        "architecture_name": arch,
        "organization_id": ORG,
        "organization_name": "Example",
        "subscription_status_label": "Simple Content Access",
        "content_facet_attributes": {
            "content_view_id": 4,
            "content_view_name": VIEW,
            "content_view_version_id": SNAPSHOT,
            "content_view_version": "3.0",
            "content_view_default": false,
            "lifecycle_environment_name": "Production",
            "errata_counts": {"total": 0}
        },
        "facts": {
            "distribution::version": version,
            "distribution::name": "Red Hat Enterprise Linux Server",
            "cpu::cpu_socket(s)": 2
        }
    })
}

// =============================================================================
// HANDLERS
// =============================================================================

type Shared = State<Arc<FakeApi>>;

fn denied(api: &FakeApi, headers: &HeaderMap) -> bool {
    api.deny_all.load(Ordering::SeqCst) || !headers.contains_key("authorization")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"message": "Unable to authenticate user admin"}})),
    )
        .into_response()
}

async fn status(State(api): Shared, headers: HeaderMap) -> Response {
    if denied(&api, &headers) {
        return unauthorized();
    }
    let delay = *api.status_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(json!({"result": "ok", "status": 200, "version": "6.15.0"})).into_response()
}

async fn host(State(api): Shared, headers: HeaderMap, Path(name): Path<String>) -> Response {
    if denied(&api, &headers) {
        return unauthorized();
    }
    if name != HOST {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": format!("Resource host not found by id '{name}'")}})),
        )
            .into_response();
    }
    Json(api.host_json.lock().unwrap().clone()).into_response()
}

async fn organization_repositories(
    State(api): Shared,
    headers: HeaderMap,
    Path(org): Path<u64>,
) -> Response {
    if denied(&api, &headers) {
        return unauthorized();
    }
    let names: Vec<Value> = if org == ORG {
        let mut names: Vec<Value> = api
            .enabled
            .lock()
            .unwrap()
            .iter()
            .map(|n| json!({"name": n, "product": {"name": "Red Hat Enterprise Linux Server"}}))
            .collect();
        names.push(json!({"name": "Custom EPEL 7", "product": {"name": "EPEL"}}));
        names
    } else {
        Vec::new()
    };
    Json(json!({"total": names.len(), "subtotal": names.len(), "results": names})).into_response()
}

async fn content_view_version(
    State(api): Shared,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if denied(&api, &headers) {
        return unauthorized();
    }
    if id != SNAPSHOT {
        return StatusCode::NOT_FOUND.into_response();
    }
    let repositories: Vec<Value> = api
        .required
        .channels()
        .iter()
        .enumerate()
        .map(|(i, c)| json!({"id": 100 + i as u64, "name": c.name, "label": "x"}))
        .collect();
    Json(json!({
        "id": SNAPSHOT,
        "version": "3.0",
        "content_view": {"id": 4, "name": VIEW},
        "repositories": repositories
    }))
    .into_response()
}

async fn repository(State(api): Shared, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if denied(&api, &headers) {
        return unauthorized();
    }
    match api.counts.lock().unwrap().get(&id) {
        Some(rpm) => {
            Json(json!({"id": id, "content_counts": {"rpm": rpm, "erratum": 3}})).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn repository_sets(
    State(api): Shared,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if denied(&api, &headers) {
        return unauthorized();
    }
    let wanted = params.get("name").cloned().unwrap_or_default();
    // Name search on the real server is fuzzy; return a near miss as well.
    let results: Vec<Value> = api
        .sets
        .iter()
        .filter(|(name, _)| name.contains(wanted.as_str()))
        .map(|(name, id)| json!({"id": id, "name": name}))
        .collect();
    Json(json!({"results": results})).into_response()
}

async fn enable(
    State(api): Shared,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if denied(&api, &headers) {
        return unauthorized();
    }
    api.enable_bodies.lock().unwrap().push(body.clone());
    let release = body["releasever"].as_str().map(str::to_string);
    let Some(name) = api.produces.get(&(id, release)).cloned() else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"displayMessage": "No such repository"})),
        )
            .into_response();
    };
    if api.conflicts.lock().unwrap().contains(&id) {
        api.enabled.lock().unwrap().insert(name);
        return (
            StatusCode::CONFLICT,
            Json(json!({"displayMessage": "The repository is already enabled"})),
        )
            .into_response();
    }
    api.enabled.lock().unwrap().insert(name);
    Json(json!({"id": "task-1", "state": "planned"})).into_response()
}

// =============================================================================
// SERVER
// =============================================================================

/// Serve `api` on an ephemeral local port and return its base URL.
pub async fn serve(api: Arc<FakeApi>) -> String {
    let app = Router::new()
        .route("/api/status", get(status))
        .route("/api/hosts/{name}", get(host))
        .route(
            "/katello/api/organizations/{id}/repositories",
            get(organization_repositories),
        )
        .route(
            "/katello/api/content_view_versions/{id}",
            get(content_view_version),
        )
        .route("/katello/api/repositories/{id}", get(repository))
        .route("/katello/api/repository_sets", get(repository_sets))
        .route("/katello/api/repository_sets/{id}/enable", put(enable))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

pub fn settings(server: &str) -> Settings {
    Settings {
        server: server.to_string(),
        username: USER.to_string(),
        password: PASSWORD.to_string(),
        ca_cert: None,
        timeout: Duration::from_secs(5),
        enable_via: EnableVia::Api,
        hammer_path: PathBuf::from("hammer"),
    }
}
