//! Campaign driver — the full hypothesis lifecycle over one bar series.
//!
//! A campaign splits the series into one evaluation window followed by
//! consecutive shadow windows, then drives:
//! Draft → Evaluated → (guardrails) → Promoted → shadow monitoring → Decayed.
//!
//! Windows are processed strictly in order; window i+1 starts only after
//! window i's shadow point and any lifecycle transition are committed. Each
//! window replays on a fresh engine and a fresh hypothesis instance —
//! nothing mutable is shared between windows.

use chrono::NaiveDateTime;
use hypolab_core::domain::{Bar, HypothesisId};
use hypolab_core::hypothesis::HypothesisRegistry;
use hypolab_core::lifecycle::{
    GuardrailVerdict, HypothesisRecord, HypothesisStatus, LifecycleError, ShadowPoint,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{CampaignSettings, RunConfig};
use crate::runner::{run_evaluation, EvaluationResult, RunError};
use crate::store::{EvaluationStore, StoreError, StoreKey, StoreRecord, TransitionEntry};

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("run error: {0}")]
    Run(#[from] RunError),
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("campaign needs at least one evaluation bar, got {0}")]
    NotEnoughData(usize),
}

/// One observed lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleTransition {
    pub from: HypothesisStatus,
    pub to: HypothesisStatus,
    /// Shadow window index that caused the transition, if any.
    pub window: Option<usize>,
    pub timestamp: NaiveDateTime,
    pub reason: Option<String>,
}

/// Everything a campaign produced.
#[derive(Debug)]
pub struct CampaignReport {
    pub record: HypothesisRecord,
    pub evaluation: EvaluationResult,
    pub verdict: GuardrailVerdict,
    /// One result per processed shadow window, in window order.
    pub shadow_results: Vec<EvaluationResult>,
    pub transitions: Vec<LifecycleTransition>,
}

/// Split a series into the evaluation window and full-length shadow windows.
///
/// A partial trailing window is dropped, never padded.
pub fn split_windows<'a>(
    bars: &'a [Bar],
    settings: &CampaignSettings,
) -> (&'a [Bar], Vec<&'a [Bar]>) {
    let eval_end = settings.evaluation_bars.min(bars.len());
    let evaluation = &bars[..eval_end];
    let mut shadows = Vec::new();
    let mut start = eval_end;
    while shadows.len() < settings.max_shadow_windows {
        let end = start + settings.shadow_window_bars;
        if end > bars.len() {
            break;
        }
        shadows.push(&bars[start..end]);
        start = end;
    }
    (evaluation, shadows)
}

/// Drive the full lifecycle for one (hypothesis, params, series) triple.
///
/// If `store` is given, the evaluation, every shadow result, and every
/// transition are appended under idempotent keys.
pub fn run_campaign(
    config: &RunConfig,
    bars: &[Bar],
    registry: &HypothesisRegistry,
    mut store: Option<&mut EvaluationStore>,
) -> Result<CampaignReport, CampaignError> {
    let (eval_bars, shadow_windows) = split_windows(bars, &config.campaign);
    if eval_bars.is_empty() {
        return Err(CampaignError::NotEnoughData(bars.len()));
    }

    let mut record = HypothesisRecord::register(
        HypothesisId::new(config.hypothesis.id.clone()),
        config.hypothesis.params.clone(),
    );
    let mut transitions = Vec::new();
    let params_hash = config.params_hash().to_string();

    // ── Evaluation window ──
    let evaluation = run_evaluation(config, eval_bars, registry)?;
    let evaluated_at = eval_bars[eval_bars.len() - 1].timestamp;
    record.mark_evaluated(evaluation.metrics.evaluation_summary())?;
    push_transition(
        &mut transitions,
        HypothesisStatus::Draft,
        HypothesisStatus::Evaluated,
        None,
        evaluated_at,
        None,
    );
    if let Some(store) = store.as_deref_mut() {
        store.append(&StoreRecord::Evaluation {
            key: StoreKey::new(&config.hypothesis.id, &params_hash, "evaluation"),
            result: evaluation.clone(),
        })?;
    }

    // ── Promotion gate ──
    let verdict = record.promote(
        evaluated_at,
        config.replay.initial_capital,
        &config.guardrails,
    )?;
    let mut shadow_results = Vec::new();

    if verdict.is_promoted() {
        push_transition(
            &mut transitions,
            HypothesisStatus::Evaluated,
            HypothesisStatus::Promoted,
            None,
            evaluated_at,
            None,
        );

        // ── Shadow monitoring, strictly in window order ──
        // Each window replays at the configured capital; window return
        // factors compound onto the promotion-time anchor so the shadow
        // curve is one continuous equity series.
        let mut shadow_equity = config.replay.initial_capital;
        for (index, window) in shadow_windows.iter().enumerate() {
            let result = run_evaluation(config, window, registry)?;
            shadow_equity *= result.return_factor();
            let point = ShadowPoint {
                timestamp: window[window.len() - 1].timestamp,
                equity: shadow_equity,
            };

            let before = record.status();
            let after = record.record_shadow_window(point, &config.decay)?;
            if before == HypothesisStatus::Promoted && after == HypothesisStatus::Decayed {
                let reason = record.decay_reason().map(|r| format!("{r:?}"));
                push_transition(
                    &mut transitions,
                    before,
                    after,
                    Some(index),
                    point.timestamp,
                    reason,
                );
            }

            if let Some(store) = store.as_deref_mut() {
                store.append(&StoreRecord::Evaluation {
                    key: StoreKey::new(
                        &config.hypothesis.id,
                        &params_hash,
                        &format!("shadow-{index}"),
                    ),
                    result: result.clone(),
                })?;
            }
            shadow_results.push(result);
        }
    }

    if let Some(store) = store.as_deref_mut() {
        for transition in &transitions {
            let window = transition
                .window
                .map_or_else(String::new, |w| format!("-{w}"));
            let label = format!("transition-{:?}{}", transition.to, window).to_lowercase();
            store.append(&StoreRecord::Transition(TransitionEntry {
                key: StoreKey::new(&config.hypothesis.id, &params_hash, &label),
                from: transition.from,
                to: transition.to,
                timestamp: transition.timestamp,
                reason: transition.reason.clone(),
            }))?;
        }
    }

    Ok(CampaignReport {
        record,
        evaluation,
        verdict,
        shadow_results,
        transitions,
    })
}

fn push_transition(
    transitions: &mut Vec<LifecycleTransition>,
    from: HypothesisStatus,
    to: HypothesisStatus,
    window: Option<usize>,
    timestamp: NaiveDateTime,
    reason: Option<String>,
) {
    transitions.push(LifecycleTransition {
        from,
        to,
        window,
        timestamp,
        reason,
    });
}
