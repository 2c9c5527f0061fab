// =============================================================================
// Quant Analysis: Command Line Entry Point
// =============================================================================
//
//   quant-analysis <bars.json> [SYMBOL...]
//
// `bars.json` maps each symbol to its array of daily bars. Every requested
// symbol (all of them when none are named) is analysed on the blocking pool;
// the results are printed to stdout as one JSON array. A symbol whose bars
// are malformed is reported in place and does not stop the others.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context};
use futures_util::future::join_all;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use quant_analysis::{AnalysisOrchestrator, RuntimeConfig, TimeSeries};

const DEFAULT_CONFIG_PATH: &str = "analysis_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(input_path) = args.next() else {
        bail!("usage: quant-analysis <bars.json> [SYMBOL...]");
    };
    let requested: Vec<String> = args.collect();

    let config_path =
        std::env::var("QUANT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    let orchestrator = Arc::new(AnalysisOrchestrator::new(config).context("invalid analysis config")?);

    // ── 2. Load bars ─────────────────────────────────────────────────────
    let raw = std::fs::read_to_string(&input_path)
        .with_context(|| format!("failed to read bars from {input_path}"))?;
    let by_symbol: BTreeMap<String, Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{input_path} must map symbols to bar arrays"))?;

    let symbols = select_symbols(&requested, &by_symbol);
    info!(count = symbols.len(), input = %input_path, "Analysing symbols");

    // ── 3. Fan out on the blocking pool ──────────────────────────────────
    let tasks = symbols.into_iter().map(|symbol| {
        let bars = by_symbol.get(&symbol).cloned();
        let engine = orchestrator.clone();
        tokio::task::spawn_blocking(move || analyse_symbol(&engine, symbol, bars))
    });

    let mut output = Vec::new();
    let (mut analysed, mut failures) = (0usize, 0usize);
    for joined in join_all(tasks).await {
        match joined {
            Ok(Ok(result)) => {
                analysed += 1;
                output.push(result);
            }
            Ok(Err(report)) => {
                failures += 1;
                output.push(report);
            }
            Err(e) => {
                failures += 1;
                error!(error = %e, "analysis task panicked");
            }
        }
    }

    // ── 4. Emit ──────────────────────────────────────────────────────────
    println!("{}", serde_json::to_string_pretty(&output)?);
    info!(analysed, failures, "Done");
    Ok(())
}

/// Symbols named on the command line (trimmed, first occurrence kept), or
/// every symbol in the input when none are named.
fn select_symbols(requested: &[String], available: &BTreeMap<String, Value>) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::with_capacity(requested.len());
    for name in requested.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !symbols.iter().any(|s| s == name) {
            symbols.push(name.to_string());
        }
    }
    if symbols.is_empty() {
        symbols = available.keys().cloned().collect();
    }
    symbols
}

/// Analyse one symbol. The `Err` side is a JSON error record for the output.
fn analyse_symbol(
    engine: &AnalysisOrchestrator,
    symbol: String,
    bars: Option<Value>,
) -> Result<Value, Value> {
    let Some(bars) = bars else {
        warn!(symbol = %symbol, "symbol not present in input");
        return Err(json!({ "symbol": symbol, "error": "symbol not present in input" }));
    };

    let series = TimeSeries::from_value(bars).map_err(|e| {
        error!(symbol = %symbol, error = %e, "rejected bars");
        json!({ "symbol": symbol, "error": e.to_string() })
    })?;

    let result = engine.analyze(&symbol, &series);
    serde_json::to_value(&result).map_err(|e| {
        error!(symbol = %symbol, error = %e, "failed to serialise result");
        json!({ "symbol": symbol, "error": e.to_string() })
    })
}
