//! Routing with the sentence-transformer model.
//!
//! NOTE: These tests require the all-MiniLM-L6-v2 model (~80MB download on first run).
//! The model is cached locally after the first download. Run with:
//!   cargo test -p e2e-tests --test semantic_routing_test -- --ignored --nocapture

use std::sync::{Arc, OnceLock};

use pretty_assertions::assert_eq;

use e2e_tests::{TestHarness, BUILTIN_CATALOG, EXAMPLE_CATALOG};
use router_embeddings::{CandleEmbedder, EmbeddingModel};

/// Shared embedder across tests to avoid concurrent model loading.
static EMBEDDER: OnceLock<Arc<CandleEmbedder>> = OnceLock::new();

fn get_embedder() -> Arc<CandleEmbedder> {
    EMBEDDER
        .get_or_init(|| {
            let embedder =
                CandleEmbedder::load_default().expect("Failed to load embedding model");
            Arc::new(embedder)
        })
        .clone()
}

fn model_harness(pairs: &[(&str, &str)]) -> TestHarness {
    let embedder: Arc<dyn EmbeddingModel> = get_embedder();
    TestHarness::with_embedder(pairs, embedder, None)
}

#[tokio::test]
#[ignore = "requires model download (~80MB on first run)"]
async fn test_memory_question_routes_to_ram_check() {
    let harness = model_harness(&EXAMPLE_CATALOG).initialized().await;

    let report = harness
        .dispatcher
        .execute("what's my memory usage right now?")
        .await
        .unwrap();
    assert_eq!(report.matched_function, "check_ram");
}

#[tokio::test]
#[ignore = "requires model download (~80MB on first run)"]
async fn test_calculator_request_routes_to_calculator() {
    let harness = model_harness(&EXAMPLE_CATALOG).initialized().await;

    let report = harness
        .dispatcher
        .execute("launch the calculator")
        .await
        .unwrap();
    assert_eq!(report.matched_function, "open_calculator");
}

#[tokio::test]
#[ignore = "requires model download (~80MB on first run)"]
async fn test_paraphrases_route_across_builtins() {
    let harness = model_harness(&BUILTIN_CATALOG).initialized().await;

    for (prompt, expected) in [
        ("I need to do some arithmetic", "open_calculator"),
        ("browse the web", "open_chrome"),
        ("how much memory am I using?", "check_ram_usage"),
        ("execute this terminal command", "run_shell_command"),
    ] {
        let results = harness.dispatcher.resolve(prompt, 1).await.unwrap();
        assert_eq!(results[0].identifier(), expected, "prompt: {prompt}");
    }
}

#[tokio::test]
#[ignore = "requires model download (~80MB on first run)"]
async fn test_model_distances_are_bounded() {
    let harness = model_harness(&BUILTIN_CATALOG).initialized().await;

    // Unit vectors: squared L2 lies in [0, 4].
    let results = harness
        .dispatcher
        .resolve("open a program", BUILTIN_CATALOG.len())
        .await
        .unwrap();
    for result in &results {
        assert!((0.0..=4.0 + 1e-4).contains(&result.distance));
    }
    assert_eq!(
        harness.retriever.stats().dimension,
        get_embedder().info().dimension
    );
}
