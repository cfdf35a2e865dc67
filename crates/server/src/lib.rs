//! HTTP front for the topic document store.
//!
//! Serves the read-only question dataset and topic-level create, replace and
//! delete over a single JSON array file. Every write is a read-modify-write
//! of the whole document without locking, so concurrent writers can lose
//! updates.

#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use storage::document::{DocumentError, JsonDocumentStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the route handlers.
pub struct ApiState {
    /// Topic-level records written by clients.
    pub topics: JsonDocumentStore,

    /// Question dataset served by `GET /api/sheet`.
    pub dataset_path: PathBuf,
}

impl ApiState {
    #[must_use]
    pub fn new(topics: JsonDocumentStore, dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            topics,
            dataset_path: dataset_path.into(),
        }
    }
}

type ApiError = (StatusCode, Json<Value>);

fn write_failed() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Document could not be written" })),
    )
}

/// Run a document operation on the blocking pool.
async fn with_document<T, F>(state: &ApiState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&JsonDocumentStore) -> Result<T, DocumentError> + Send + 'static,
{
    let store = state.topics.clone();
    match tokio::task::spawn_blocking(move || op(&store)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "document write failed");
            Err(write_failed())
        }
        Err(err) => {
            tracing::error!(error = %err, "document task did not finish");
            Err(write_failed())
        }
    }
}

/// `GET /api/sheet`
pub async fn read_dataset(State(state): State<Arc<ApiState>>) -> Result<Json<Value>, ApiError> {
    let path = &state.dataset_path;
    tracing::debug!(path = %path.display(), "reading dataset");

    let parsed = match tokio::fs::read_to_string(path).await {
        Ok(raw) => serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    parsed.map(Json).map_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "dataset could not be read");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Dataset could not be read" })),
        )
    })
}

/// `POST /api/topic`: append the body and echo it back.
pub async fn create_topic(
    State(state): State<Arc<ApiState>>,
    Json(record): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let created = with_document(&state, move |store| store.append(record)).await?;
    Ok(Json(created))
}

/// `DELETE /api/topic/:id`
pub async fn delete_topic(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let key = id.clone();
    let removed = with_document(&state, move |store| store.remove(&key)).await?;
    tracing::debug!(id = %id, removed, "topic delete");
    Ok(Json(json!({ "message": "deleted" })))
}

/// `PUT /api/topic/:id`: replace every record with a matching top-level id.
pub async fn replace_topic(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(record): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let key = id.clone();
    let replaced = with_document(&state, move |store| store.replace(&key, &record)).await?;
    tracing::debug!(id = %id, replaced, "topic replace");
    Ok(Json(json!({ "message": "updated" })))
}

/// Build the API router with all routes.
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/sheet", get(read_dataset))
        .route("/api/topic", post(create_topic))
        .route("/api/topic/:id", put(replace_topic).delete(delete_topic))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(())
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let status = response.status();
                        if !status.is_success() {
                            tracing::warn!(
                                status = %status,
                                latency_ms = latency.as_millis(),
                                "request failed"
                            );
                        }
                    },
                ),
        )
        .with_state(state)
}

/// Bind `bind_addr` and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: Arc<ApiState>, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!(bind = bind_addr, "sheet API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
