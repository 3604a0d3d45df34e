// src/lifecycle/runner.rs
//! Drives one candidate through the call lifecycle:
//! initiate -> wait for webhook (poll on timeout) -> analyze -> persist.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::phase::{CallPhase, FailureReason};
use super::tracker::WebhookTracker;
use crate::core::{Candidate, CandidateRepository, Database, TimingConfig};
use crate::dialer::{CallScript, DialerClient, Intent};
use crate::utils::{normalize_pay, normalize_phone};

/// Shared dependencies for running call lifecycles. Cheap to clone: the pool
/// and HTTP client are handles.
#[derive(Clone)]
pub struct CallContext {
    pub db: Database,
    pub dialer: DialerClient,
    pub tracker: Arc<WebhookTracker>,
    pub timing: TimingConfig,
}

#[derive(Debug)]
pub struct CallOutcome {
    pub candidate_id: i64,
    pub call_id: Option<String>,
    pub intent: Intent,
    pub summary: Option<String>,
    pub phase: CallPhase,
}

/// Build the templated call script from a candidate row. `user_name`
/// carries the candidate id so the pathway can echo it back.
pub fn script_for(candidate: &Candidate) -> CallScript {
    CallScript {
        user_name: candidate.id.to_string(),
        full_name: candidate.full_name.clone().unwrap_or_default(),
        job_title: candidate.job_title.clone().unwrap_or_default(),
        location: candidate.location.clone().unwrap_or_default(),
        pay: normalize_pay(candidate.estimated_pay.as_deref().unwrap_or_default()),
        phone_number: None,
        work_experience: None,
    }
}

/// Run the full lifecycle for one candidate. Never propagates an error:
/// every failure lands in an absorbing phase with an `error` intent written
/// back to the row where possible.
pub async fn run_call(ctx: &CallContext, candidate: &Candidate) -> CallOutcome {
    let mut phase = CallPhase::Scheduled;
    let repo = CandidateRepository::new(ctx.db.pool());

    let fail = |phase: CallPhase, call_id: Option<String>| CallOutcome {
        candidate_id: candidate.id,
        call_id,
        intent: Intent::Error,
        summary: None,
        phase,
    };

    let phone = match candidate
        .phone_numbers
        .as_deref()
        .and_then(normalize_phone)
    {
        Some(phone) => phone,
        None => {
            warn!(
                "Candidate {} has no dialable phone number, skipping",
                candidate.id
            );
            let _ = phase.advance(CallPhase::Failed(FailureReason::Initiation));
            if let Err(e) = repo.record_failure(candidate.id, Intent::Error.as_str()).await {
                error!("Failed to record failure for {}: {}", candidate.id, e);
            }
            return fail(phase, None);
        }
    };

    // Initiate
    let call_id = match ctx.dialer.place_call(&phone, script_for(candidate)).await {
        Ok(call_id) => call_id,
        Err(e) => {
            error!("Call initiation failed for candidate {}: {}", candidate.id, e);
            let _ = phase.advance(CallPhase::Failed(FailureReason::Initiation));
            if let Err(e) = repo.record_failure(candidate.id, Intent::Error.as_str()).await {
                error!("Failed to record failure for {}: {}", candidate.id, e);
            }
            return fail(phase, None);
        }
    };

    let _ = phase.advance(CallPhase::Initiated);
    info!(
        "Call {} initiated for candidate {} ({})",
        call_id, candidate.id, phone
    );

    // Register before touching the database so a webhook racing the call id
    // write still finds a waiter.
    let rx = ctx.tracker.register(&call_id).await;

    if let Err(e) = repo.record_call_id(candidate.id, &call_id).await {
        error!("Failed to record call id for {}: {}", candidate.id, e);
        ctx.tracker.abandon(&call_id).await;
        let _ = phase.advance(CallPhase::Failed(FailureReason::Persistence));
        return fail(phase, Some(call_id));
    }

    // Wait for the webhook; fall back to polling when it never arrives.
    let summary = match wait_for_completion(ctx, &call_id, rx, &mut phase).await {
        Some(summary) => summary,
        None => {
            error!("Call {} never completed within the poll budget", call_id);
            let _ = phase.advance(CallPhase::Failed(FailureReason::Timeout));
            if let Err(e) = repo
                .record_outcome(&call_id, Intent::Error.as_str(), None)
                .await
            {
                error!("Failed to record timeout for call {}: {}", call_id, e);
            }
            return fail(phase, Some(call_id));
        }
    };

    // Analyze
    let intent = ctx.dialer.analyze_intent(&call_id).await;
    let summary = match summary {
        Some(summary) => Some(summary),
        None => ctx.dialer.call_summary(&call_id).await,
    };

    if intent == Intent::Error {
        let _ = phase.advance(CallPhase::Failed(FailureReason::Analysis));
    } else {
        let _ = phase.advance(CallPhase::Analyzed);
    }

    // Persist
    match repo
        .record_outcome(&call_id, intent.as_str(), summary.as_deref())
        .await
    {
        Ok(matched) => {
            if !matched {
                warn!("Call {} outcome matched no candidate row", call_id);
            }
            if phase == CallPhase::Analyzed {
                let _ = phase.advance(CallPhase::Persisted);
            }
        }
        Err(e) => {
            error!("Failed to persist outcome for call {}: {}", call_id, e);
            let _ = phase.advance(CallPhase::Failed(FailureReason::Persistence));
        }
    }

    info!(
        "Call {} finished: phase={} intent={}",
        call_id, phase, intent
    );

    CallOutcome {
        candidate_id: candidate.id,
        call_id: Some(call_id),
        intent,
        summary,
        phase,
    }
}

/// Wait for call completion: webhook first, polling as fallback. Returns the
/// summary (possibly absent) on completion, `None` when the poll budget is
/// exhausted.
async fn wait_for_completion(
    ctx: &CallContext,
    call_id: &str,
    rx: tokio::sync::oneshot::Receiver<super::tracker::WebhookEvent>,
    phase: &mut CallPhase,
) -> Option<Option<String>> {
    let _ = phase.advance(CallPhase::AwaitingWebhook);

    let webhook_wait = Duration::from_secs(ctx.timing.webhook_wait_secs);
    tokio::select! {
        event = rx => {
            if let Ok(event) = event {
                info!(
                    "Webhook completed call {} (status: {})",
                    call_id,
                    event.status.as_deref().unwrap_or("unknown")
                );
                let _ = phase.advance(CallPhase::Completed);
                return Some(event.summary);
            }
            // Sender dropped without an event; fall through to polling.
        }
        _ = tokio::time::sleep(webhook_wait) => {
            info!("Webhook wait expired for call {}, polling", call_id);
        }
    }

    ctx.tracker.abandon(call_id).await;
    let _ = phase.advance(CallPhase::Polling);

    let interval = Duration::from_secs(ctx.timing.poll_interval_secs);
    for attempt in 1..=ctx.timing.max_poll_attempts {
        match ctx.dialer.fetch_call(call_id).await {
            Ok(details) if details.is_completed() => {
                info!("Poll attempt {} found call {} completed", attempt, call_id);
                let _ = phase.advance(CallPhase::Completed);
                return Some(details.summary);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Poll attempt {} for call {} failed: {}",
                    attempt, call_id, e
                );
            }
        }
        tokio::time::sleep(interval).await;
    }

    None
}

/// Collect the result of a call placed outside the candidate pipeline
/// (manual job applications). Persists the outcome only if the call id
/// happens to match a candidate row.
pub async fn collect_detached_result(ctx: CallContext, call_id: String) {
    let mut phase = CallPhase::Initiated;
    let rx = ctx.tracker.register(&call_id).await;

    let summary = match wait_for_completion(&ctx, &call_id, rx, &mut phase).await {
        Some(summary) => summary,
        None => {
            error!("Detached call {} never completed", call_id);
            return;
        }
    };

    let intent = ctx.dialer.analyze_intent(&call_id).await;
    let summary = match summary {
        Some(summary) => Some(summary),
        None => ctx.dialer.call_summary(&call_id).await,
    };

    let repo = CandidateRepository::new(ctx.db.pool());
    match repo
        .record_outcome(&call_id, intent.as_str(), summary.as_deref())
        .await
    {
        Ok(_) => info!("Detached call {} finished: intent={}", call_id, intent),
        Err(e) => error!("Failed to persist detached call {}: {}", call_id, e),
    }
}
