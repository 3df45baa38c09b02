//! Batch sweeps — many configs over one series, in parallel.
//!
//! Every run builds its own engine, hypothesis, and executor; nothing
//! mutable is shared between runs, so parallelism cannot contaminate state.
//! Results come back in input order regardless of scheduling.

use hypolab_core::domain::Bar;
use hypolab_core::hypothesis::HypothesisRegistry;
use rayon::prelude::*;

use crate::config::RunConfig;
use crate::runner::{run_evaluation, EvaluationResult, RunError};

/// Run each config against the same bars, one disjoint engine per config.
pub fn run_batch(
    configs: &[RunConfig],
    bars: &[Bar],
    registry: &HypothesisRegistry,
) -> Vec<Result<EvaluationResult, RunError>> {
    configs
        .par_iter()
        .map(|config| run_evaluation(config, bars, registry))
        .collect()
}
