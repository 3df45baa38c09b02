//! HypothesisRecord — per-hypothesis lifecycle state, spanning evaluation
//! windows.
//!
//! The record owns its status and shadow curve privately; every mutation
//! goes through the transition validator, so arbitrary field writes cannot
//! bypass the state machine. The shadow curve is append-only.

use super::decay::{DecayPolicy, DecayReason, DecayVerdict};
use super::guardrails::{EvaluationSummary, GuardrailVerdict, PromotionGuardrails};
use super::status::{transition, HypothesisStatus, LifecycleError};
use crate::domain::{HypothesisId, Params, ParamsHash};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One point of post-promotion tracked performance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Lifecycle record for a registered hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisRecord {
    id: HypothesisId,
    params: Params,
    params_hash: ParamsHash,
    status: HypothesisStatus,
    last_evaluation: Option<EvaluationSummary>,
    promoted_at: Option<NaiveDateTime>,
    sharpe_at_promotion: Option<f64>,
    /// Hash of the guardrail policy the promotion was judged against.
    guardrail_hash: Option<String>,
    shadow_curve: Vec<ShadowPoint>,
    decay_reason: Option<DecayReason>,
}

impl HypothesisRecord {
    /// Register a fresh hypothesis in Draft. Re-registration after decay
    /// means calling this again for a new record.
    pub fn register(id: HypothesisId, params: Params) -> Self {
        let params_hash = ParamsHash::of(&params);
        Self {
            id,
            params,
            params_hash,
            status: HypothesisStatus::Draft,
            last_evaluation: None,
            promoted_at: None,
            sharpe_at_promotion: None,
            guardrail_hash: None,
            shadow_curve: Vec::new(),
            decay_reason: None,
        }
    }

    pub fn id(&self) -> &HypothesisId {
        &self.id
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_hash(&self) -> &ParamsHash {
        &self.params_hash
    }

    pub fn status(&self) -> HypothesisStatus {
        self.status
    }

    pub fn last_evaluation(&self) -> Option<&EvaluationSummary> {
        self.last_evaluation.as_ref()
    }

    pub fn promoted_at(&self) -> Option<NaiveDateTime> {
        self.promoted_at
    }

    pub fn sharpe_at_promotion(&self) -> Option<f64> {
        self.sharpe_at_promotion
    }

    pub fn guardrail_hash(&self) -> Option<&str> {
        self.guardrail_hash.as_deref()
    }

    pub fn shadow_curve(&self) -> &[ShadowPoint] {
        &self.shadow_curve
    }

    pub fn decay_reason(&self) -> Option<&DecayReason> {
        self.decay_reason.as_ref()
    }

    /// Record a completed evaluation run.
    pub fn mark_evaluated(&mut self, summary: EvaluationSummary) -> Result<(), LifecycleError> {
        self.status = transition(self.status, HypothesisStatus::Evaluated)?;
        self.last_evaluation = Some(summary);
        Ok(())
    }

    /// Attempt promotion against the guardrail policy.
    ///
    /// On promotion the record stores the policy hash and its Sharpe at
    /// promotion, and seeds the shadow curve with an anchor point at
    /// `baseline_equity`. A rejection leaves the record Evaluated.
    pub fn promote(
        &mut self,
        at: NaiveDateTime,
        baseline_equity: f64,
        guardrails: &PromotionGuardrails,
    ) -> Result<GuardrailVerdict, LifecycleError> {
        // Validate the transition up front so a promotion attempt from an
        // illegal state fails loudly even when the guardrails would reject.
        if !self.status.can_transition(HypothesisStatus::Promoted) {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                to: HypothesisStatus::Promoted,
            });
        }
        let summary = self.last_evaluation.as_ref().ok_or(
            // Evaluated without a summary cannot happen through this API.
            LifecycleError::IllegalTransition {
                from: self.status,
                to: HypothesisStatus::Promoted,
            },
        )?;

        let verdict = guardrails.verify(summary);
        if verdict.is_promoted() {
            self.sharpe_at_promotion = Some(summary.sharpe);
            self.status = transition(self.status, HypothesisStatus::Promoted)?;
            self.promoted_at = Some(at);
            self.guardrail_hash = Some(guardrails.policy_hash());
            self.shadow_curve.push(ShadowPoint {
                timestamp: at,
                equity: baseline_equity,
            });
        }
        Ok(verdict)
    }

    /// Manually freeze a promoted hypothesis. Terminal.
    pub fn freeze(&mut self) -> Result<(), LifecycleError> {
        self.status = transition(self.status, HypothesisStatus::Frozen)?;
        Ok(())
    }

    /// Manually retire a promoted hypothesis. Terminal.
    pub fn retire(&mut self) -> Result<(), LifecycleError> {
        self.status = transition(self.status, HypothesisStatus::Retired)?;
        Ok(())
    }

    /// Append one post-promotion shadow window and run the decay triggers.
    ///
    /// The first satisfied trigger transitions the record to Decayed,
    /// immediately and irreversibly. Later appends keep recording points but
    /// the status never changes again — no flapping.
    pub fn record_shadow_window(
        &mut self,
        point: ShadowPoint,
        policy: &DecayPolicy,
    ) -> Result<HypothesisStatus, LifecycleError> {
        match self.status {
            HypothesisStatus::Promoted => {
                self.shadow_curve.push(point);
                let sharpe_at_promotion = self.sharpe_at_promotion.unwrap_or(0.0);
                if let DecayVerdict::Decayed(reason) =
                    policy.evaluate(&self.shadow_curve, sharpe_at_promotion)
                {
                    self.status = transition(self.status, HypothesisStatus::Decayed)?;
                    self.decay_reason = Some(reason);
                }
                Ok(self.status)
            }
            HypothesisStatus::Decayed => {
                // Monitoring may continue; the verdict is final.
                self.shadow_curve.push(point);
                Ok(self.status)
            }
            status => Err(LifecycleError::NotPromoted { status }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn passing_summary() -> EvaluationSummary {
        EvaluationSummary {
            trade_count: 40,
            sharpe: 1.5,
            total_return: 0.2,
            max_drawdown: -0.08,
        }
    }

    fn promoted_record() -> HypothesisRecord {
        let mut record =
            HypothesisRecord::register(HypothesisId::new("simple_momentum"), Params::new());
        record.mark_evaluated(passing_summary()).unwrap();
        let verdict = record
            .promote(ts(1), 100_000.0, &PromotionGuardrails::default())
            .unwrap();
        assert!(verdict.is_promoted());
        record
    }

    #[test]
    fn registration_starts_draft() {
        let record = HypothesisRecord::register(HypothesisId::new("x"), Params::new());
        assert_eq!(record.status(), HypothesisStatus::Draft);
        assert!(record.shadow_curve().is_empty());
    }

    #[test]
    fn promotion_records_policy_hash_and_anchor() {
        let record = promoted_record();
        assert_eq!(record.status(), HypothesisStatus::Promoted);
        assert_eq!(record.promoted_at(), Some(ts(1)));
        assert_eq!(record.sharpe_at_promotion(), Some(1.5));
        assert_eq!(
            record.guardrail_hash(),
            Some(PromotionGuardrails::default().policy_hash().as_str())
        );
        assert_eq!(record.shadow_curve().len(), 1);
        assert_eq!(record.shadow_curve()[0].equity, 100_000.0);
    }

    #[test]
    fn rejection_leaves_record_evaluated() {
        let mut record = HypothesisRecord::register(HypothesisId::new("x"), Params::new());
        let mut summary = passing_summary();
        summary.trade_count = 2;
        record.mark_evaluated(summary).unwrap();
        let verdict = record
            .promote(ts(1), 100_000.0, &PromotionGuardrails::default())
            .unwrap();
        assert!(!verdict.is_promoted());
        assert_eq!(record.status(), HypothesisStatus::Evaluated);
        assert!(record.shadow_curve().is_empty());
    }

    #[test]
    fn promote_from_draft_is_illegal() {
        let mut record = HypothesisRecord::register(HypothesisId::new("x"), Params::new());
        let err = record
            .promote(ts(1), 100_000.0, &PromotionGuardrails::default())
            .unwrap_err();
        assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
    }

    #[test]
    fn re_evaluation_replaces_summary() {
        let mut record = HypothesisRecord::register(HypothesisId::new("x"), Params::new());
        record.mark_evaluated(passing_summary()).unwrap();
        let mut second = passing_summary();
        second.sharpe = 0.9;
        record.mark_evaluated(second).unwrap();
        assert_eq!(record.last_evaluation().unwrap().sharpe, 0.9);
    }

    #[test]
    fn shadow_window_before_promotion_rejected() {
        let mut record = HypothesisRecord::register(HypothesisId::new("x"), Params::new());
        let err = record
            .record_shadow_window(
                ShadowPoint {
                    timestamp: ts(2),
                    equity: 100_000.0,
                },
                &DecayPolicy::default(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::NotPromoted {
                status: HypothesisStatus::Draft
            }
        );
    }

    #[test]
    fn decay_fires_exactly_once_and_sticks() {
        let mut record = promoted_record();
        let policy = DecayPolicy {
            max_shadow_drawdown: 0.10,
            max_sharpe_drop_pct: 10.0,
            max_negative_windows: 100,
        };

        // Window 1: small dip, healthy.
        let status = record
            .record_shadow_window(
                ShadowPoint {
                    timestamp: ts(2),
                    equity: 95_000.0,
                },
                &policy,
            )
            .unwrap();
        assert_eq!(status, HypothesisStatus::Promoted);

        // Window 2: drawdown 12% from the 100k peak → decayed here.
        let status = record
            .record_shadow_window(
                ShadowPoint {
                    timestamp: ts(3),
                    equity: 88_000.0,
                },
                &policy,
            )
            .unwrap();
        assert_eq!(status, HypothesisStatus::Decayed);
        assert!(matches!(
            record.decay_reason(),
            Some(DecayReason::DrawdownBreach { .. })
        ));

        // Window 3: recovery does not revive the record.
        let status = record
            .record_shadow_window(
                ShadowPoint {
                    timestamp: ts(4),
                    equity: 120_000.0,
                },
                &policy,
            )
            .unwrap();
        assert_eq!(status, HypothesisStatus::Decayed);
        assert_eq!(record.shadow_curve().len(), 4);
    }

    #[test]
    fn frozen_and_retired_are_manual_terminals() {
        let mut record = promoted_record();
        record.freeze().unwrap();
        assert_eq!(record.status(), HypothesisStatus::Frozen);
        assert!(record.retire().is_err());

        let mut record = promoted_record();
        record.retire().unwrap();
        assert_eq!(record.status(), HypothesisStatus::Retired);
    }

    #[test]
    fn record_serialization_roundtrip() {
        let record = promoted_record();
        let json = serde_json::to_string(&record).unwrap();
        let deser: HypothesisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deser);
    }
}
