//! Shared helpers for router-level tests.
//!
//! The router runs over in-memory repositories and is driven with
//! `tower::ServiceExt::oneshot`, so no database or network is needed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use jotter_api::{create_router, AppState, NoteService, ServerConfig};
use jotter_core::memory::{
    MemoryNoteRepository, MemoryPlaceRepository, MemoryPremiumRepository, MemoryQuotaRepository,
    MemorySettingsRepository,
};
use jotter_core::{Place, PlaceKind, QuotaValidator, StorageUrl, TextParser};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceRecord {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub city_code: Option<String>,
}

/// Places and named sets of search parameters loaded from
/// `tests/fixtures/<kind>.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureManager {
    places: Vec<PlaceRecord>,
    #[serde(flatten)]
    sets: HashMap<String, Vec<HashMap<String, String>>>,
}

impl FixtureManager {
    pub fn load(kind: PlaceKind) -> Self {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(format!("{}.json", kind));
        let raw = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
        serde_json::from_str(&raw).unwrap_or_else(|e| panic!("parse {}: {}", path.display(), e))
    }

    pub fn places(&self, kind: PlaceKind) -> Vec<Place> {
        self.places
            .iter()
            .map(|r| Place {
                kind,
                code: r.code.clone(),
                name: r.name.clone(),
                country_code: r.country_code.clone(),
                city_code: r.city_code.clone(),
            })
            .collect()
    }

    /// Parameter sets of the named fixture. Panics on an unknown name.
    pub fn set(&self, name: &str) -> &[HashMap<String, String>] {
        self.sets
            .get(name)
            .unwrap_or_else(|| panic!("unknown fixture set '{}'", name))
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Trims text, as the real client does when the parser is unreachable.
pub struct TrimParser;

#[async_trait]
impl TextParser for TrimParser {
    async fn parse_or_original(&self, text: &str) -> String {
        text.trim().to_string()
    }
}

pub struct TestApp {
    pub router: Router,
    pub quotas: Arc<MemoryQuotaRepository>,
    pub premium: Arc<MemoryPremiumRepository>,
    pub settings: Arc<MemorySettingsRepository>,
    pub places: Arc<MemoryPlaceRepository>,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        rate_limit_enabled: false,
        ..ServerConfig::default()
    }
}

/// App over empty in-memory repositories with the given settings seeded.
pub fn app_with(settings: &[(&str, i64)], configure: impl FnOnce(AppState) -> AppState) -> TestApp {
    let quotas = Arc::new(MemoryQuotaRepository::new());
    let premium = Arc::new(MemoryPremiumRepository::new());
    let settings_repo = Arc::new(MemorySettingsRepository::new());
    for (key, value) in settings {
        settings_repo.insert(key, value.to_string());
    }
    let places = Arc::new(MemoryPlaceRepository::new());

    let quota = QuotaValidator::new(quotas.clone(), premium.clone(), settings_repo.clone());
    let notes = NoteService::new(
        Arc::new(MemoryNoteRepository::new()),
        quota,
        Arc::new(TrimParser),
        StorageUrl::new("https://s3.example.com", Some("notes")),
    );
    let state = configure(AppState::new(notes, places.clone()));

    TestApp {
        router: create_router(state, &test_config()),
        quotas,
        premium,
        settings: settings_repo,
        places,
    }
}

pub fn app() -> TestApp {
    app_with(&[], |state| state)
}

/// App with both place fixtures loaded.
pub fn places_app() -> TestApp {
    let app = app();
    for kind in [PlaceKind::Airport, PlaceKind::City] {
        for place in FixtureManager::load(kind).places(kind) {
            app.places.insert(place);
        }
    }
    app
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// `path?k=v&...` with percent-encoded values.
pub fn with_query(path: &str, params: &HashMap<String, String>) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let mut pairs: Vec<_> = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect();
    pairs.sort();
    format!("{}?{}", path, pairs.join("&"))
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    match body {
        Some(val) => builder.body(Body::from(val.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Envelope request as sent by the web client.
pub fn action_request(user_id: Option<i64>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/notes")
        .header("content-type", "application/json")
        .header("x-requested-with", "XMLHttpRequest");
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
}
