#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use vinyl_shop::db::Database;
use vinyl_shop::discogs::DiscogsClient;
use vinyl_shop::media::{MediaAttachment, MediaError, MediaStore};

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_USER_AGENT: &str = "VinylShopDiscogs/1.0 +http://shop.test";

/// Release with notes, tracklist, two genres and two styles
pub const FULL_RELEASE_ID: u64 = 249504;
/// Release with only an id and a title
pub const BARE_RELEASE_ID: u64 = 1958;
/// Upstream answers 404 with a JSON message
pub const MISSING_RELEASE_ID: u64 = 404;
/// Upstream answers 500 with a non-JSON body
pub const BROKEN_RELEASE_ID: u64 = 500;
/// Upstream answers 200 with malformed JSON
pub const GARBLED_RELEASE_ID: u64 = 7;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub async fn temp_database() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("shop.db");
    let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
    (db, temp_dir)
}

#[derive(Clone, Default)]
struct MockState {
    base_url: String,
    hits: Arc<AtomicUsize>,
    user_agents: Arc<Mutex<Vec<String>>>,
}

/// In-process stand-in for api.discogs.com
pub struct MockDiscogs {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    user_agents: Arc<Mutex<Vec<String>>>,
}

impl MockDiscogs {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = MockState {
            base_url: base_url.clone(),
            ..Default::default()
        };
        let hits = state.hits.clone();
        let user_agents = state.user_agents.clone();

        let app = Router::new()
            .route("/database/search", get(search))
            .route("/releases/:id", get(release))
            .route("/images/:name", get(image))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockDiscogs {
            base_url,
            hits,
            user_agents,
        }
    }

    /// Catalog requests received so far (image downloads excluded)
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().unwrap().clone()
    }

    pub fn client(&self) -> DiscogsClient {
        DiscogsClient::new(Some(TEST_TOKEN.to_string()))
            .with_base_url(&self.base_url)
            .with_user_agent(TEST_USER_AGENT)
    }

    pub fn image_url(&self) -> String {
        format!("{}/images/cover.jpg", self.base_url)
    }
}

fn record(state: &MockState, headers: &HeaderMap) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(agent) = headers.get(USER_AGENT).and_then(|v| v.to_str().ok()) {
        state.user_agents.lock().unwrap().push(agent.to_string());
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "You must authenticate to access this resource." })),
    )
        .into_response()
}

async fn search(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&state, &headers);
    if params.get("token").map(String::as_str) != Some(TEST_TOKEN) {
        return unauthorized();
    }

    let query = params.get("q").cloned().unwrap_or_default();
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);

    Json(json!({
        "pagination": { "page": page, "pages": 3, "per_page": 20, "items": 41 },
        "results": [
            {
                "id": FULL_RELEASE_ID,
                "title": format!("John Coltrane - {}", query),
                "year": "1957",
                "format": ["Vinyl", "LP", "Album"],
                "label": ["Blue Note", "Blue Note"],
                "country": "US",
                "genre": ["Jazz"],
                "style": ["Hard Bop"],
                "thumb": "https://i.discogs.com/thumb.jpg",
                "cover_image": "https://i.discogs.com/cover.jpg"
            },
            {
                "id": BARE_RELEASE_ID,
                "title": "Unknown Artist - Untitled",
                "year": 1958
            }
        ]
    }))
    .into_response()
}

async fn release(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&state, &headers);
    if params.get("token").map(String::as_str) != Some(TEST_TOKEN) {
        return unauthorized();
    }

    match id {
        FULL_RELEASE_ID => Json(full_release(&state.base_url)).into_response(),
        BARE_RELEASE_ID => Json(json!({ "id": BARE_RELEASE_ID, "title": "Untitled" })).into_response(),
        BROKEN_RELEASE_ID => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        GARBLED_RELEASE_ID => (StatusCode::OK, "{\"id\": 7, \"title\": ").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Release not found." })),
        )
            .into_response(),
    }
}

async fn image(Path(name): Path<String>) -> Response {
    if name == "tiny.jpg" {
        return (StatusCode::OK, vec![0u8; 10]).into_response();
    }
    (StatusCode::OK, vec![0xFFu8; 2048]).into_response()
}

pub fn full_release(base_url: &str) -> Value {
    json!({
        "id": FULL_RELEASE_ID,
        "title": "Blue Train",
        "artists": [{ "id": 97545, "name": "John Coltrane" }],
        "artists_sort": "Coltrane, John",
        "labels": [{ "name": "Blue Note", "catno": "BLP 1577" }],
        "country": "US",
        "released": "1957",
        "year": 1957,
        "genres": ["Jazz", "Funk / Soul"],
        "styles": ["Hard Bop", "Soul-Jazz"],
        "formats": [{ "name": "Vinyl", "qty": "1", "descriptions": ["LP", "Album", "Mono"] }],
        "tracklist": [
            { "position": "A1", "title": "Blue Train", "duration": "10:43" },
            { "position": "A2", "title": "Moment's Notice", "duration": "9:10" },
            { "position": "B1", "title": "Locomotion", "duration": "" }
        ],
        "notes": "Recorded at Van Gelder Studio.\n\nOriginal mono pressing.",
        "images": [
            { "type": "primary", "uri": format!("{}/images/cover.jpg", base_url), "uri150": "" }
        ],
        "thumb": "https://i.discogs.com/thumb.jpg",
        "cover_image": "https://i.discogs.com/cover.jpg"
    })
}

/// Media store that never touches the network
#[derive(Default)]
pub struct MockMediaStore {
    pub fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockMediaStore {
    pub fn failing() -> Self {
        MockMediaStore {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn sideload(&self, url: &str, title: &str) -> Result<MediaAttachment, MediaError> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(MediaError::Status(503));
        }
        Ok(MediaAttachment {
            path: PathBuf::from("/media/cover.jpg"),
            source_url: url.to_string(),
            title: title.to_string(),
        })
    }
}
