use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use e2e_tests::{BUILTIN_CATALOG, HASHING_DIMENSION};
use router_embeddings::{CandleEmbedder, EmbeddingModel, HashingEmbedder};
use router_retrieval::Retriever;
use router_types::ActionCatalog;

const QUERY_WORDS: [&str; 12] = [
    "open", "check", "memory", "calculator", "browser", "run", "command", "usage", "system",
    "home", "page", "shell",
];

#[derive(Parser, Debug)]
#[command(name = "perf_bench", about = "Action router resolve benchmark")]
struct Args {
    #[arg(long, value_enum, default_value = "hashing")]
    embedder: EmbedderKind,
    /// Catalog size; the built-in actions are padded with synthetic ones
    #[arg(long, default_value_t = 256)]
    actions: usize,
    #[arg(long, default_value_t = 500)]
    queries: usize,
    #[arg(long, default_value_t = 5)]
    top_k: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum EmbedderKind {
    Hashing,
    Candle,
}

#[derive(Debug, Serialize)]
struct StepMetrics {
    p50_ms: f64,
    p90_ms: f64,
    p99_ms: f64,
    samples: usize,
}

#[derive(Debug, Serialize)]
struct BenchmarkOutput {
    embedder: EmbedderKind,
    dimension: usize,
    actions: usize,
    top_k: usize,
    initialize_ms: f64,
    resolve: StepMetrics,
}

fn random_phrase(rng: &mut StdRng, words: usize) -> String {
    (0..words)
        .map(|_| QUERY_WORDS[rng.random_range(0..QUERY_WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_catalog(size: usize, rng: &mut StdRng) -> Result<ActionCatalog, String> {
    let mut pairs: Vec<(String, String)> = BUILTIN_CATALOG
        .iter()
        .map(|(id, desc)| (id.to_string(), desc.to_string()))
        .collect();
    for i in pairs.len()..size {
        pairs.push((format!("synthetic_{i}"), random_phrase(rng, 8)));
    }
    ActionCatalog::from_pairs(pairs).map_err(|e| format!("Invalid catalog: {e}"))
}

fn percentile(values: &[f64], percentile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let rank = (percentile / 100.0) * (values.len() as f64 - 1.0);
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    if low == high {
        values[low]
    } else {
        let weight = rank - low as f64;
        values[low] + (values[high] - values[low]) * weight
    }
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let embedder: Arc<dyn EmbeddingModel> = match args.embedder {
        EmbedderKind::Hashing => Arc::new(
            HashingEmbedder::new(HASHING_DIMENSION).map_err(|e| format!("Embedder: {e}"))?,
        ),
        EmbedderKind::Candle => Arc::new(
            CandleEmbedder::load_default().map_err(|e| format!("Failed to load model: {e}"))?,
        ),
    };
    let dimension = embedder.info().dimension;

    let catalog = build_catalog(args.actions, &mut rng)?;
    let retriever = Retriever::new(embedder);

    let start = Instant::now();
    retriever
        .initialize(catalog.descriptors())
        .map_err(|e| format!("Initialize failed: {e}"))?;
    let initialize_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut samples = Vec::with_capacity(args.queries);
    for _ in 0..args.queries {
        let query = random_phrase(&mut rng, 4);
        let start = Instant::now();
        retriever
            .resolve(&query, args.top_k)
            .map_err(|e| format!("Resolve failed: {e}"))?;
        samples.push(start.elapsed().as_secs_f64() * 1000.0);
    }
    samples.sort_by(f64::total_cmp);

    let output = BenchmarkOutput {
        embedder: args.embedder,
        dimension,
        actions: catalog.len(),
        top_k: args.top_k,
        initialize_ms,
        resolve: StepMetrics {
            p50_ms: percentile(&samples, 50.0),
            p90_ms: percentile(&samples, 90.0),
            p99_ms: percentile(&samples, 99.0),
            samples: samples.len(),
        },
    };

    let json = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
