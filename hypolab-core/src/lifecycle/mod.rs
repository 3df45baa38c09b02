//! Hypothesis lifecycle: promotion guardrails, status machine, decay
//! monitoring.
//!
//! Lifecycle state spans evaluation windows and is owned independently of
//! any single replay run.

pub mod decay;
pub mod guardrails;
pub mod record;
pub mod status;

pub use decay::{DecayPolicy, DecayReason, DecayVerdict};
pub use guardrails::{EvaluationSummary, GuardrailVerdict, PromotionGuardrails};
pub use record::{HypothesisRecord, ShadowPoint};
pub use status::{HypothesisStatus, LifecycleError};
