//! API Handlers
//!
//! HTTP request handlers for the peer endpoint and operational endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::config::validate_base_path;
use crate::error::{CacheError, Result};
use crate::group::Registry;
use crate::models::{FetchRequest, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups this node can serve
    pub registry: Arc<Registry>,
    /// This node's address, used to tag log lines
    pub self_addr: Arc<str>,
    /// Request namespace the peer endpoint is mounted under
    pub base_path: Arc<str>,
}

impl AppState {
    /// Creates a new AppState.
    ///
    /// Fails when `base_path` is not a mountable namespace, so a node never
    /// starts serving requests outside of it.
    pub fn new(registry: Arc<Registry>, self_addr: &str, base_path: &str) -> Result<Self> {
        validate_base_path(base_path)?;
        Ok(Self {
            registry,
            self_addr: Arc::from(self_addr),
            base_path: Arc::from(base_path),
        })
    }

    /// Creates a new AppState from configuration and the process-wide registry.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Self::new(crate::group::global(), &config.self_addr, &config.base_path)
    }
}

/// Handler for GET <base_path><group>/<key>
///
/// Resolves the group and returns the raw cached bytes. Group and key are
/// matched on the raw path and decoded separately, so either may carry an
/// encoded `/`.
pub async fn fetch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Path(request): Path<FetchRequest>,
) -> Result<Response> {
    info!("[Server {}] {} {}", state.self_addr, method, uri.path());

    let group = state
        .registry
        .lookup(&request.group)
        .ok_or_else(|| CacheError::GroupNotFound(request.group.clone()))?;

    let view = group
        .get(&request.key)
        .await
        .map_err(CacheError::into_lookup_failure)?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.to_bytes(),
    )
        .into_response())
}

/// Handler for namespace paths that do not name both a group and a key.
pub async fn malformed_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> CacheError {
    info!("[Server {}] {} {}", state.self_addr, method, uri.path());
    CacheError::BadRequest("bad request".to_string())
}

/// Handler for GET /stats/:group
///
/// Returns the local cache statistics of one group.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = state
        .registry
        .lookup(&name)
        .ok_or_else(|| CacheError::GroupNotFound(name.clone()))?;

    Ok(Json(StatsResponse::new(name, &group.stats())))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(&*state.self_addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{GetterFn, Group};
    use axum::http::StatusCode;
    use bytes::Bytes;

    fn test_state() -> AppState {
        let registry = Arc::new(Registry::new());
        registry.register(Group::new(
            "scores",
            0,
            GetterFn(|key: &str| match key {
                "Tom" => Ok(Bytes::from_static(b"630")),
                _ => Err(CacheError::LookupFailed(format!("{} not exist", key))),
            }),
        ));
        AppState::new(registry, "http://127.0.0.1:8001", "/_gocache/").unwrap()
    }

    async fn fetch(state: AppState, group: &str, key: &str) -> Result<Response> {
        let uri: Uri = format!("/_gocache/{}/{}", group, key).parse().unwrap();
        let request = FetchRequest::new(group, key);
        fetch_handler(State(state), Method::GET, uri, Path(request)).await
    }

    #[tokio::test]
    async fn test_fetch_handler_success() {
        let response = fetch(test_state(), "scores", "Tom").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_malformed_handler_is_bad_request() {
        let uri: Uri = "/_gocache/onlygroup".parse().unwrap();
        let err = malformed_handler(State(test_state()), Method::GET, uri).await;
        assert_eq!(err, CacheError::BadRequest("bad request".into()));
    }

    #[tokio::test]
    async fn test_fetch_handler_unknown_group() {
        let err = fetch(test_state(), "unknown", "Tom").await.unwrap_err();
        assert_eq!(err, CacheError::GroupNotFound("unknown".into()));
    }

    #[tokio::test]
    async fn test_fetch_handler_lookup_failed() {
        let err = fetch(test_state(), "scores", "Nobody").await.unwrap_err();
        assert_eq!(err, CacheError::LookupFailed("Nobody not exist".into()));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        fetch(state.clone(), "scores", "Tom").await.unwrap();
        fetch(state.clone(), "scores", "Tom").await.unwrap();

        let response = stats_handler(State(state), Path("scores".to_string()))
            .await
            .unwrap();
        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.total_entries, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(test_state())).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.node, "http://127.0.0.1:8001");
    }

    #[test]
    fn test_app_state_rejects_bad_base_path() {
        let result = AppState::new(Arc::new(Registry::new()), "http://a:1", "/_gocache");
        assert!(matches!(result, Err(CacheError::Config(_))));
    }
}
