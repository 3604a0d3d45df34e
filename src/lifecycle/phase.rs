// src/lifecycle/phase.rs
//! The call lifecycle state machine.
//!
//! A call moves through a linear pipeline with one branch point: after
//! initiation it either completes via the inbound webhook or, once the
//! webhook wait expires, via polling. Failure is absorbing and reachable
//! from every non-terminal phase.

use anyhow::Result;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Initiation,
    Timeout,
    Analysis,
    Persistence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Scheduled,
    Initiated,
    AwaitingWebhook,
    Polling,
    Completed,
    Analyzed,
    Persisted,
    Failed(FailureReason),
}

impl CallPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallPhase::Persisted | CallPhase::Failed(_))
    }

    fn can_advance_to(&self, next: &CallPhase) -> bool {
        use CallPhase::*;

        if self.is_terminal() {
            return false;
        }
        if matches!(next, Failed(_)) {
            return true;
        }

        matches!(
            (self, next),
            (Scheduled, Initiated)
                | (Initiated, AwaitingWebhook)
                | (AwaitingWebhook, Completed)
                | (AwaitingWebhook, Polling)
                | (Polling, Completed)
                | (Completed, Analyzed)
                | (Analyzed, Persisted)
        )
    }

    /// Move to the next phase, rejecting transitions the pipeline does not
    /// define (e.g. back-edges, or leaving a terminal phase).
    pub fn advance(&mut self, next: CallPhase) -> Result<()> {
        if !self.can_advance_to(&next) {
            anyhow::bail!("Illegal call phase transition: {} -> {}", self, next);
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallPhase::Scheduled => "scheduled",
            CallPhase::Initiated => "initiated",
            CallPhase::AwaitingWebhook => "awaiting_webhook",
            CallPhase::Polling => "polling",
            CallPhase::Completed => "completed",
            CallPhase::Analyzed => "analyzed",
            CallPhase::Persisted => "persisted",
            CallPhase::Failed(reason) => {
                return write!(f, "failed({:?})", reason);
            }
        };
        f.write_str(label)
    }
}
