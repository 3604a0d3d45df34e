// src/lifecycle/mod.rs
//! Call lifecycle: the phase state machine, webhook correlation, and the
//! runner that drives a candidate from scheduling to a persisted outcome.

pub mod phase;
pub mod runner;
pub mod tracker;

pub use phase::{CallPhase, FailureReason};
pub use runner::{collect_detached_result, run_call, CallContext, CallOutcome};
pub use tracker::{WebhookEvent, WebhookTracker};
