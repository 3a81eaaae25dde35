//! HTTP routes.
//!
//! - POST /execute: route a prompt and run the matched action
//! - POST /resolve: nearest actions for a query, without running anything
//! - GET /actions: the catalog
//! - GET /health: index status

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dispatcher::{Dispatcher, ExecutionReport};
use crate::error::ServiceError;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// `top_k` used when a resolve request omits it
    pub default_top_k: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedAction {
    pub identifier: String,
    pub description: String,
    pub distance: f32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolveResponse {
    pub matches: Vec<ResolvedAction>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ActionSummary {
    pub identifier: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub initialized: bool,
    pub actions: usize,
    pub dimension: usize,
    pub model: String,
}

/// Build the router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/execute", post(execute))
        .route("/resolve", post(resolve))
        .route("/actions", get(actions))
        .route("/health", get(health))
        .with_state(state)
}

async fn execute(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecutionReport>, ServiceError> {
    let report = state.dispatcher.execute(&request.prompt).await?;
    Ok(Json(report))
}

async fn resolve(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ServiceError> {
    let top_k = request.top_k.unwrap_or(state.default_top_k);
    debug!(query = %request.query, top_k, "Resolve request");

    let matches = state
        .dispatcher
        .resolve(&request.query, top_k)
        .await?
        .into_iter()
        .map(|r| ResolvedAction {
            identifier: r.descriptor.identifier().to_string(),
            description: r.descriptor.description().to_string(),
            distance: r.distance,
        })
        .collect();

    Ok(Json(ResolveResponse { matches }))
}

async fn actions(State(state): State<AppState>) -> Json<Vec<ActionSummary>> {
    let actions = state
        .dispatcher
        .actions()
        .into_iter()
        .map(|d| ActionSummary {
            identifier: d.identifier().to_string(),
            description: d.description().to_string(),
        })
        .collect();
    Json(actions)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let retriever = state.dispatcher.retriever();
    let stats = retriever.stats();
    Json(HealthResponse {
        status: if stats.built { "ok" } else { "initializing" }.to_string(),
        initialized: stats.built,
        actions: stats.entry_count,
        dimension: stats.dimension,
        model: retriever.embedder_info().name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use router_actions::{Action, ActionError, ActionOutput, ActionRegistry};
    use router_embeddings::HashingEmbedder;
    use router_retrieval::Retriever;
    use tower::ServiceExt;

    struct Reply(&'static str);

    #[async_trait]
    impl Action for Reply {
        async fn execute(&self) -> Result<ActionOutput, ActionError> {
            Ok(ActionOutput::text(self.0))
        }
    }

    fn state() -> AppState {
        let registry = ActionRegistry::new()
            .with(
                "open_calculator",
                "Open the calculator application on the system.",
                Reply("calculator opened"),
            )
            .unwrap()
            .with(
                "check_ram",
                "Check the system RAM usage and return it as a percentage.",
                Reply("RAM Usage: 42.0%"),
            )
            .unwrap();
        let retriever = Arc::new(Retriever::new(Arc::new(HashingEmbedder::new(1024).unwrap())));
        AppState {
            dispatcher: Arc::new(Dispatcher::new(retriever, Arc::new(registry))),
            default_top_k: 1,
        }
    }

    async fn ready_state() -> AppState {
        let state = state();
        state.dispatcher.initialize().await.unwrap();
        state
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_execute_endpoint() {
        let app = build_router(ready_state().await);
        let response = app
            .oneshot(post_json(
                "/execute",
                serde_json::json!({ "prompt": "what's my memory usage right now?" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["prompt"], "what's my memory usage right now?");
        assert_eq!(body["matched_function"], "check_ram");
        assert_eq!(body["execution_result"], "RAM Usage: 42.0%");
        assert!(body["generated_code_snippet"].is_null());
        assert!(body.get("snippet_error").is_none());
    }

    #[tokio::test]
    async fn test_execute_empty_prompt_is_bad_request() {
        let app = build_router(ready_state().await);
        let response = app
            .oneshot(post_json("/execute", serde_json::json!({ "prompt": "" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_execute_punctuation_prompt_is_bad_request() {
        let app = build_router(ready_state().await);
        let response = app
            .oneshot(post_json("/execute", serde_json::json!({ "prompt": "?!?" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("alphanumeric"));
        assert!(body.get("matched_function").is_none());
    }

    #[tokio::test]
    async fn test_execute_before_initialize_is_unavailable() {
        let app = build_router(state());
        let response = app
            .oneshot(post_json(
                "/execute",
                serde_json::json!({ "prompt": "launch the calculator" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_resolve_endpoint() {
        let app = build_router(ready_state().await);
        let response = app
            .oneshot(post_json(
                "/resolve",
                serde_json::json!({ "query": "launch the calculator", "top_k": 2 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ResolveResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.matches.len(), 2);
        assert_eq!(body.matches[0].identifier, "open_calculator");
        assert!(body.matches[0].distance <= body.matches[1].distance);
    }

    #[tokio::test]
    async fn test_resolve_uses_default_top_k() {
        let app = build_router(ready_state().await);
        let response = app
            .oneshot(post_json(
                "/resolve",
                serde_json::json!({ "query": "launch the calculator" }),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["matches"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_zero_top_k_is_bad_request() {
        let app = build_router(ready_state().await);
        let response = app
            .oneshot(post_json(
                "/resolve",
                serde_json::json!({ "query": "launch the calculator", "top_k": 0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_actions_endpoint() {
        let app = build_router(state());
        let response = app
            .oneshot(Request::builder().uri("/actions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let actions: Vec<ActionSummary> = serde_json::from_slice(&bytes).unwrap();
        let ids: Vec<&str> = actions.iter().map(|a| a.identifier.as_str()).collect();
        assert_eq!(ids, vec!["open_calculator", "check_ram"]);
    }

    #[tokio::test]
    async fn test_health_reports_index() {
        let app = build_router(state());
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["initialized"], false);
        assert_eq!(body["status"], "initializing");

        let ready = build_router(ready_state().await);
        let response = ready
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: HealthResponse = serde_json::from_slice(
            &to_bytes(response.into_body(), usize::MAX).await.unwrap(),
        )
        .unwrap();
        assert_eq!(
            body,
            HealthResponse {
                status: "ok".to_string(),
                initialized: true,
                actions: 2,
                dimension: 1024,
                model: "feature-hashing-1024".to_string(),
            }
        );
    }
}
