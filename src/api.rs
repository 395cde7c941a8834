//! Read-only HTTP API over the processed snapshot.

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::TARGET_WEB_REQUEST;

/// Where `/news` reads the processed snapshot from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    Local(PathBuf),
    /// A mirror serving the same JSON document over HTTP.
    Remote(String),
}

#[derive(Clone)]
struct ApiState {
    source: Arc<SnapshotSource>,
    client: reqwest::Client,
}

/// Build the router: `GET /healthz` and `GET /news`.
pub fn router(source: SnapshotSource) -> Router {
    let state = ApiState {
        source: Arc::new(source),
        client: reqwest::Client::new(),
    };

    Router::new()
        .route("/healthz", get(healthz))
        .route("/news", get(news))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, source: SnapshotSource) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Server running on http://{} serving {:?}", addr, source);
    axum::serve(listener, router(source)).await?;
    Ok(())
}

async fn healthz() -> &'static str {
    "OK"
}

async fn news(State(state): State<ApiState>) -> Response {
    match state.source.as_ref() {
        SnapshotSource::Local(path) => local_snapshot(path).await,
        SnapshotSource::Remote(url) => remote_snapshot(&state.client, url).await,
    }
}

async fn local_snapshot(path: &Path) -> Response {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        warn!(target: TARGET_WEB_REQUEST, "Processed news not found at {}", path.display());
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Processed news not found",
                "path": path.display().to_string(),
            })),
        )
            .into_response();
    }

    let parsed = match tokio::fs::read_to_string(path).await {
        Ok(raw) => serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    match parsed {
        Ok(value) => Json(value).into_response(),
        Err(detail) => {
            error!(target: TARGET_WEB_REQUEST, "Failed to load {}: {}", path.display(), detail);
            internal_error("Failed to load processed news", detail)
        }
    }
}

async fn remote_snapshot(client: &reqwest::Client, url: &str) -> Response {
    let fetched = async {
        client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
    .await;

    match fetched {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            error!(target: TARGET_WEB_REQUEST, "Failed to fetch processed news from {}: {}", url, e);
            internal_error("Failed to fetch processed news", e.to_string())
        }
    }
}

fn internal_error(message: &str, detail: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message, "detail": detail })),
    )
        .into_response()
}
