//! Integration tests for the action router daemon.
//!
//! Starts the HTTP server over the built-in actions (hashing embedder, no
//! code generation) and drives it with a real HTTP client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use router_daemon::build_dispatcher;
use router_service::{run_server_with_shutdown, AppState};
use router_types::{EmbedderBackend, Settings};

/// Test harness that manages server lifecycle.
struct TestHarness {
    base_url: String,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    server_handle: tokio::task::JoinHandle<Result<(), Box<dyn std::error::Error + Send + Sync>>>,
}

impl TestHarness {
    async fn new() -> Self {
        let mut settings = Settings::default();
        settings.embedder.backend = EmbedderBackend::Hashing;
        settings.codegen.enabled = false;
        settings.actions.shell_command = Some("echo routed".to_string());

        let dispatcher = build_dispatcher(&settings)
            .await
            .expect("Failed to build dispatcher");
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            default_top_k: 1,
        };

        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let server_handle = tokio::spawn(run_server_with_shutdown(addr, state, async {
            shutdown_rx.await.ok();
        }));

        // Wait for server to start
        sleep(Duration::from_millis(200)).await;

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            shutdown_tx: Some(shutdown_tx),
            server_handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let result = tokio::time::timeout(Duration::from_secs(5), self.server_handle)
            .await
            .expect("Server did not shut down")
            .expect("Server task panicked");
        assert!(result.is_ok());
    }
}

#[tokio::test]
async fn test_health_and_catalog() {
    let harness = TestHarness::new().await;
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(harness.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["actions"], 4);

    let actions: Vec<serde_json::Value> = client
        .get(harness.url("/actions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = actions
        .iter()
        .filter_map(|a| a["identifier"].as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["open_calculator", "open_chrome", "check_ram_usage", "run_shell_command"]
    );

    harness.shutdown().await;
}

#[tokio::test]
async fn test_execute_check_ram() {
    let harness = TestHarness::new().await;
    let client = reqwest::Client::new();

    let response = client
        .post(harness.url("/execute"))
        .json(&serde_json::json!({ "prompt": "how much RAM is used" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["matched_function"], "check_ram_usage");
    assert!(body["execution_result"]
        .as_str()
        .unwrap()
        .starts_with("RAM Usage: "));
    assert!(body["generated_code_snippet"].is_null());

    harness.shutdown().await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_execute_shell_command() {
    let harness = TestHarness::new().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(harness.url("/execute"))
        .json(&serde_json::json!({ "prompt": "run a shell command" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["matched_function"], "run_shell_command");
    assert_eq!(body["execution_result"], "routed");

    harness.shutdown().await;
}

#[tokio::test]
async fn test_resolve_and_errors() {
    let harness = TestHarness::new().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(harness.url("/resolve"))
        .json(&serde_json::json!({ "query": "open chrome browser", "top_k": 10 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 4);
    assert_eq!(matches[0]["identifier"], "open_chrome");

    let response = client
        .post(harness.url("/execute"))
        .json(&serde_json::json!({ "prompt": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    harness.shutdown().await;
}
