//! Common test utilities: a local server emulating the metadata API.
//!
//! Entity operations are delegated to an in-memory catalog, so saved assets
//! can be read back. Tags are stored under internal ids, the way the real
//! server does, which makes the connector's tag translation observable.

use atlan_client::model::{Asset, AtlanTagColor, AtlanTagDef, DeleteType, TypeDefResponse};
use atlan_client::{AtlanConnector, AtlanError, CatalogConnector, MockCatalogConnector, SaveOptions};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TEST_TOKEN: &str = "test-token";
pub const PII_ID: &str = "kVD2fX0MTSZ1x9Qz3wTC7f";
pub const CONFIDENTIAL_ID: &str = "jZq7mY4dWbN2oHk8rPe5tA";

/// A request as received by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[derive(Clone)]
pub struct FakeAtlan {
    pub catalog: Arc<MockCatalogConnector>,
    pub tag_defs: Arc<Mutex<Vec<AtlanTagDef>>>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Number of upcoming requests answered with 503.
    pub failures: Arc<AtomicU32>,
    pub typedef_reads: Arc<AtomicU32>,
}

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn tag_def(id: &str, display_name: &str) -> AtlanTagDef {
    let mut def = AtlanTagDef::creator(display_name, AtlanTagColor::Red);
    def.name = id.to_string();
    def
}

fn error_reply(error: AtlanError) -> (StatusCode, Json<Value>) {
    let (status, code) = match &error {
        AtlanError::NotFound(_) => (StatusCode::NOT_FOUND, "ATLAS-404-00-005"),
        AtlanError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "ATLAS-400-00-01A"),
        AtlanError::Conflict(_) => (StatusCode::CONFLICT, "ATLAS-409-00-001"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "ATLAS-500-00-001"),
    };
    (
        status,
        Json(json!({ "errorCode": code, "errorMessage": error.to_string() })),
    )
}

fn to_json<T: serde::Serialize>(value: T) -> Reply {
    serde_json::to_value(value)
        .map(Json)
        .map_err(|e| error_reply(AtlanError::Internal(e.to_string())))
}

impl FakeAtlan {
    pub fn new() -> Self {
        Self::with_catalog(MockCatalogConnector::new("fake"))
    }

    pub fn with_catalog(catalog: MockCatalogConnector) -> Self {
        Self {
            catalog: Arc::new(catalog),
            tag_defs: Arc::new(Mutex::new(vec![
                tag_def(PII_ID, "PII"),
                tag_def(CONFIDENTIAL_ID, "Confidential"),
            ])),
            requests: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(AtomicU32::new(0)),
            typedef_reads: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn fail_next(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn last_request(&self, method: &str, path_prefix: &str) -> Option<RecordedRequest> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == method && r.path.starts_with(path_prefix))
    }

    fn record(&self, method: &'static str, path: String, query: &[(String, String)], body: Option<&Value>) {
        self.requests.lock().expect("requests lock").push(RecordedRequest {
            method,
            path,
            query: query.to_vec(),
            body: body.cloned(),
        });
    }

    fn check(&self, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "errorMessage": "Service temporarily unavailable" })),
            ));
        }
        let expected = format!("Bearer {}", TEST_TOKEN);
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some(value) if value == expected => Ok(()),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "errorCode": "ATLAN-401", "errorMessage": "Invalid API token" })),
            )),
        }
    }

    /// Starts the server on an ephemeral port and returns its base URL.
    pub async fn spawn(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let app = router(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });
        format!("http://{}", addr)
    }
}

fn router(state: FakeAtlan) -> Router {
    Router::new()
        .route("/api/service/users/current", get(current_user))
        .route("/api/meta/entity/guid/:guid", get(entity_by_guid))
        .route(
            "/api/meta/entity/uniqueAttribute/type/:type_name",
            get(entity_by_qualified_name),
        )
        .route("/api/meta/entity/bulk", post(save_entities).delete(delete_entities))
        .route("/api/meta/entity/restore/bulk", post(restore_entities))
        .route("/api/meta/search/indexsearch", post(index_search))
        .route("/api/meta/types/typedefs", get(get_typedefs).post(create_typedefs))
        .route("/api/meta/types/typedef/name/:name", delete(purge_typedef))
        .with_state(state)
}

async fn current_user(State(state): State<FakeAtlan>, headers: HeaderMap) -> Reply {
    state.record("GET", "/api/service/users/current".into(), &[], None);
    state.check(&headers)?;
    Ok(Json(json!({ "username": "jo", "email": "jo@example.com" })))
}

async fn entity_by_guid(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Path(guid): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    state.record("GET", format!("/api/meta/entity/guid/{}", guid), &query, None);
    state.check(&headers)?;
    let asset = state
        .catalog
        .get_by_guid(&guid, false, false)
        .await
        .map_err(error_reply)?;
    Ok(Json(json!({ "entity": asset, "referredEntities": {} })))
}

async fn entity_by_qualified_name(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Path(type_name): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    state.record(
        "GET",
        format!("/api/meta/entity/uniqueAttribute/type/{}", type_name),
        &query,
        None,
    );
    state.check(&headers)?;
    let qualified_name = query
        .iter()
        .find(|(k, _)| k == "attr:qualifiedName")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();
    let asset = state
        .catalog
        .get_by_qualified_name(&type_name, &qualified_name, false, false)
        .await
        .map_err(error_reply)?;
    Ok(Json(json!({ "entity": asset, "referredEntities": {} })))
}

#[derive(Deserialize)]
struct BulkRequest {
    entities: Vec<Asset>,
}

async fn save_entities(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    Json(body): Json<Value>,
) -> Reply {
    state.record("POST", "/api/meta/entity/bulk".into(), &query, Some(&body));
    state.check(&headers)?;
    let flag = |key: &str| query.iter().any(|(k, v)| k == key && v == "true");
    let options = SaveOptions {
        replace_atlan_tags: flag("replaceClassifications"),
        append_atlan_tags: flag("appendTags"),
    };
    let request: BulkRequest = serde_json::from_value(body)
        .map_err(|e| error_reply(AtlanError::InvalidRequest(e.to_string())))?;
    let response = state
        .catalog
        .save(request.entities, options)
        .await
        .map_err(error_reply)?;
    to_json(response)
}

async fn delete_entities(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    state.record("DELETE", "/api/meta/entity/bulk".into(), &query, None);
    state.check(&headers)?;
    let guids: Vec<String> = query
        .iter()
        .filter(|(k, _)| k == "guid")
        .map(|(_, v)| v.clone())
        .collect();
    let delete_type = if query.iter().any(|(k, v)| k == "deleteType" && v == "HARD") {
        DeleteType::Hard
    } else {
        DeleteType::Soft
    };
    let response = state
        .catalog
        .delete(&guids, delete_type)
        .await
        .map_err(error_reply)?;
    to_json(response)
}

async fn restore_entities(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    state.record("POST", "/api/meta/entity/restore/bulk".into(), &query, None);
    state.check(&headers)?;
    let guids: Vec<String> = query
        .iter()
        .filter(|(k, _)| k == "guid")
        .map(|(_, v)| v.clone())
        .collect();
    let response = state.catalog.restore(&guids).await.map_err(error_reply)?;
    to_json(response)
}

/// Pages through every stored asset; the query itself is only recorded.
async fn index_search(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.record("POST", "/api/meta/search/indexsearch".into(), &[], Some(&body));
    state.check(&headers)?;
    let from = body["dsl"]["from"].as_u64().unwrap_or(0) as usize;
    let size = body["dsl"]["size"].as_u64().unwrap_or(20) as usize;
    let assets = state.catalog.assets().await;
    let page: Vec<&Asset> = assets.iter().skip(from).take(size).collect();
    if page.is_empty() {
        return Ok(Json(json!({ "approximateCount": assets.len() })));
    }
    Ok(Json(json!({ "approximateCount": assets.len(), "entities": page })))
}

async fn get_typedefs(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    state.record("GET", "/api/meta/types/typedefs".into(), &query, None);
    state.check(&headers)?;
    state.typedef_reads.fetch_add(1, Ordering::SeqCst);
    let defs = state.tag_defs.lock().expect("tag defs lock").clone();
    let is_tags = query.iter().any(|(k, v)| k == "type" && v == "classification");
    let response = if is_tags {
        defs.into_iter()
            .fold(TypeDefResponse::default(), TypeDefResponse::with_atlan_tag)
    } else {
        TypeDefResponse::default()
    };
    to_json(response)
}

async fn create_typedefs(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Json(mut body): Json<TypeDefResponse>,
) -> Reply {
    state.record("POST", "/api/meta/types/typedefs".into(), &[], None);
    state.check(&headers)?;
    let mut defs = state.tag_defs.lock().expect("tag defs lock");
    for (i, def) in body.classification_defs.iter_mut().enumerate() {
        def.name = format!("generated{}{}", defs.len(), i);
        defs.push(def.clone());
    }
    to_json(body)
}

async fn purge_typedef(
    State(state): State<FakeAtlan>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state.record("DELETE", format!("/api/meta/types/typedef/name/{}", name), &[], None);
    state.check(&headers)?;
    let mut defs = state.tag_defs.lock().expect("tag defs lock");
    let before = defs.len();
    defs.retain(|d| d.name != name);
    if defs.len() == before {
        return Err(error_reply(AtlanError::NotFound(format!("{} not found", name))));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Starts a fake server and returns it with a connector pointed at it.
pub async fn connector_for(fake: &FakeAtlan) -> AtlanConnector {
    let base_url = fake.spawn().await;
    AtlanConnector::new(atlan_client::testing::test_atlan_config(&base_url, TEST_TOKEN))
        .expect("Failed to build connector")
}

/// Like [`connector_for`], with retries enabled.
pub async fn retrying_connector_for(fake: &FakeAtlan, max_retries: u32) -> AtlanConnector {
    let base_url = fake.spawn().await;
    let mut config = atlan_client::testing::test_atlan_config(&base_url, TEST_TOKEN);
    config.client.max_retries = max_retries;
    AtlanConnector::new(config).expect("Failed to build connector")
}

/// Query parameters as a map, for requests without repeated keys.
pub fn query_map(request: &RecordedRequest) -> HashMap<String, String> {
    request.query.iter().cloned().collect()
}
