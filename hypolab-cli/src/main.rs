//! HypoLab CLI — synthetic data, single evaluations, lifecycle campaigns.
//!
//! Commands:
//! - `synth` — generate a seeded synthetic bar series as CSV
//! - `run` — evaluate one hypothesis from a TOML config over a CSV series
//! - `campaign` — drive the full lifecycle (evaluation → promotion →
//!   shadow windows → decay) and record everything to the JSONL store

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hypolab_core::hypothesis::HypothesisRegistry;
use hypolab_runner::{
    load_bars_csv, run_campaign, run_evaluation, synthetic_bars, write_bars_csv,
    EvaluationResult, EvaluationStore, RunConfig, StoreKey, StoreRecord,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hypolab", about = "HypoLab CLI — hypothesis replay engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a seeded synthetic bar series and write it as CSV.
    Synth {
        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,

        /// Number of bars.
        #[arg(long, default_value_t = 1_000)]
        bars: usize,

        /// RNG seed — same seed, same series.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First bar's open price.
        #[arg(long, default_value_t = 100.0)]
        start_price: f64,
    },
    /// Evaluate one hypothesis over a CSV bar series.
    Run {
        /// TOML run configuration.
        #[arg(long)]
        config: PathBuf,

        /// CSV bar series (timestamp,open,high,low,close,volume).
        #[arg(long)]
        data: PathBuf,

        /// Optional JSONL store to append the result to.
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Drive the full lifecycle campaign over a CSV bar series.
    Campaign {
        /// TOML run configuration (with a [campaign] section).
        #[arg(long)]
        config: PathBuf,

        /// CSV bar series.
        #[arg(long)]
        data: PathBuf,

        /// Optional JSONL store for results and transitions.
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Synth {
            out,
            bars,
            seed,
            start_price,
        } => {
            let series = synthetic_bars(seed, bars, start_price);
            write_bars_csv(&out, &series)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("wrote {} bars to {} (seed {seed})", series.len(), out.display());
        }
        Commands::Run {
            config,
            data,
            store,
        } => {
            let config = RunConfig::load(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            let bars = load_bars_csv(&data)
                .with_context(|| format!("loading bars {}", data.display()))?;
            let registry = HypothesisRegistry::with_builtins();

            let result = run_evaluation(&config, &bars, &registry)?;
            print_result(&result);

            if let Some(path) = store {
                let mut store = EvaluationStore::open(&path)?;
                let written = store.append(&StoreRecord::Evaluation {
                    key: StoreKey::new(
                        &config.hypothesis.id,
                        &config.params_hash().to_string(),
                        "evaluation",
                    ),
                    result,
                })?;
                println!(
                    "store: {}",
                    if written { "appended" } else { "already recorded (skipped)" }
                );
            }
        }
        Commands::Campaign {
            config,
            data,
            store,
        } => {
            let config = RunConfig::load(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            let bars = load_bars_csv(&data)
                .with_context(|| format!("loading bars {}", data.display()))?;
            let registry = HypothesisRegistry::with_builtins();

            let mut store_handle = match store {
                Some(path) => Some(EvaluationStore::open(&path)?),
                None => None,
            };
            let report = run_campaign(&config, &bars, &registry, store_handle.as_mut())?;

            println!("hypothesis: {}", report.record.id());
            println!("final status: {:?}", report.record.status());
            println!("evaluation:");
            print_result(&report.evaluation);
            println!("shadow windows: {}", report.shadow_results.len());
            for transition in &report.transitions {
                let window = transition
                    .window
                    .map_or_else(String::new, |w| format!(" (window {w})"));
                println!(
                    "  {:?} -> {:?}{} at {}",
                    transition.from, transition.to, window, transition.timestamp
                );
                if let Some(reason) = &transition.reason {
                    println!("    reason: {reason}");
                }
            }
        }
    }
    Ok(())
}

fn print_result(result: &EvaluationResult) {
    println!("  run id: {}", &result.run_id[..16]);
    println!("  bars: {}, trades: {}", result.bar_count, result.metrics.trade_count);
    println!(
        "  return: {:+.2}% (buy & hold {:+.2}%)",
        result.metrics.total_return * 100.0,
        result.benchmark_return * 100.0
    );
    println!(
        "  sharpe: {:.2}, max drawdown: {:.2}%, win rate: {:.0}%",
        result.metrics.sharpe,
        result.metrics.max_drawdown * 100.0,
        result.metrics.win_rate * 100.0
    );
    if result.unexecuted_count > 0 {
        println!("  unexecuted intents at termination: {}", result.unexecuted_count);
    }
    if !result.ignored.is_empty() {
        println!("  ignored (no-op) intents: {}", result.ignored.len());
    }
}
