use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Path as UrlPath, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, warn};

use crate::entry::{Entry, EntryMap};
use crate::error::{StoreError, StoreResult};
use crate::store::{QueueSnapshot, Store};
use crate::validate::{check_submission, Limits, Rejection};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub limits: Limits,
}

impl AppState {
    pub fn new(store: Store, limits: Limits) -> Self {
        Self {
            store: Arc::new(store),
            limits,
        }
    }
}

/// JSON API only.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/entries", get(list_entries).post(create_entry))
        .route("/api/entries/{id}", get(get_entry))
        .route("/api/pop", get(pop_entry))
        .route("/api/queue", get(queue))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// JSON API plus the single-page UI from `static_dir`; unknown paths get `index.html`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    create_router(state).fallback_service(spa)
}

#[derive(Deserialize)]
struct NewEntry {
    #[serde(default)]
    author: String,
    #[serde(default)]
    content: String,
}

async fn list_entries(State(state): State<AppState>) -> Result<Json<EntryMap>, ApiError> {
    let store = state.store.clone();
    let entries = run_blocking(move || store.list()).await?;
    Ok(Json(entries))
}

async fn create_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewEntry>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let (author, content) = check_submission(&body.author, &body.content, state.limits)?;
    let entry = Entry::new(author, content).with_provenance(client_ip(&headers), user_agent(&headers));

    let store = state.store.clone();
    let saved = run_blocking(move || store.save(entry)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn get_entry(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Entry>, ApiError> {
    let store = state.store.clone();
    let entry = run_blocking(move || store.get(&id)).await?;
    Ok(Json(entry))
}

async fn pop_entry(State(state): State<AppState>) -> Result<Json<Entry>, ApiError> {
    let store = state.store.clone();
    let entry = run_blocking(move || Ok(store.pop())).await?;
    Ok(Json(entry))
}

async fn queue(State(state): State<AppState>) -> Result<Json<QueueSnapshot>, ApiError> {
    let store = state.store.clone();
    let snapshot = run_blocking(move || store.queue()).await?;
    Ok(Json(snapshot))
}

/// Store calls do blocking file I/O under a lock; keep them off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res.map_err(ApiError::Store),
        Err(e) => Err(ApiError::Task(e.to_string())),
    }
}

/// First hop of `X-Forwarded-For`, else `X-Real-IP`, else empty.
fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    };
    forwarded.or_else(real).unwrap_or_default().to_string()
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug)]
pub enum ApiError {
    Invalid(Rejection),
    Store(StoreError),
    Task(String),
}

impl From<Rejection> for ApiError {
    fn from(r: Rejection) -> Self {
        ApiError::Invalid(r)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Invalid(r) => {
                warn!(target: "api", reason = %r, "rejected submission");
                (StatusCode::BAD_REQUEST, r.to_string())
            }
            ApiError::Store(StoreError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("entry {id} not found"))
            }
            ApiError::Store(e) => {
                error!(target: "api", error = %e, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage error".to_string())
            }
            ApiError::Task(e) => {
                error!(target: "api", error = %e, "blocking task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}
