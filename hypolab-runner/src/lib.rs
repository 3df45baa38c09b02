//! HypoLab Runner — evaluation orchestration around the core engine.
//!
//! - TOML run configuration with content-addressed run ids
//! - CSV and seeded synthetic bar sources
//! - Performance metrics and the buy-and-hold benchmark
//! - Single evaluations, parallel batch sweeps, and lifecycle campaigns
//! - JSONL append-only store with idempotent keys

pub mod batch;
pub mod campaign;
pub mod config;
pub mod data;
pub mod metrics;
pub mod runner;
pub mod store;

pub use batch::run_batch;
pub use campaign::{run_campaign, CampaignError, CampaignReport, LifecycleTransition};
pub use config::{CampaignSettings, ConfigError, CostConfig, HypothesisConfig, ReplaySettings, RunConfig};
pub use data::{load_bars_csv, synthetic_bars, validate_bars, write_bars_csv, LoadError};
pub use metrics::{buy_and_hold_return, PerformanceMetrics};
pub use runner::{run_evaluation, EvaluationResult, RunError, SCHEMA_VERSION};
pub use store::{EvaluationStore, StoreError, StoreKey, StoreRecord, TransitionEntry};
