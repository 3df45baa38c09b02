//! HypoLab Core — temporal-causality replay engine and hypothesis lifecycle.
//!
//! This crate contains the heart of the research engine:
//! - Domain types (bars, intents, positions, trades, identities)
//! - Monotonic simulated clock, single-writer by construction
//! - Bounded market window exposing read-only views
//! - Decision queue enforcing delayed (never same-bar) execution
//! - Bar-by-bar replay engine with a forward-only run state machine
//! - Execution collaborator with a basis-point cost model
//! - Hypothesis trait, static registry, and built-in catalog
//! - Lifecycle state machine with promotion guardrails and decay monitoring

pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod hypothesis;
pub mod lifecycle;
pub mod market;
pub mod queue;
