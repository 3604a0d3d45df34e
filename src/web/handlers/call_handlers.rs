// src/web/handlers/call_handlers.rs
//! Outbound call batch initiation and the vendor completion webhook.

use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

use crate::core::CandidateRepository;
use crate::lifecycle::{CallContext, WebhookEvent};
use crate::scheduler::CallScheduler;
use crate::web::types::{ErrorResponse, InitiateCallsResponse, WebhookPayload, WebhookResponse};

pub async fn initiate_calls_handler(
    ctx: &State<CallContext>,
    scheduler: &State<CallScheduler>,
) -> Result<Json<InitiateCallsResponse>, Json<ErrorResponse>> {
    let repo = CandidateRepository::new(ctx.db.pool());

    let candidates = repo.list_callable().await.map_err(|e| {
        Json(ErrorResponse::new(
            format!("Failed to load candidates: {}", e),
            "DATABASE_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
        ))
    })?;

    if candidates.is_empty() {
        return Ok(Json(InitiateCallsResponse {
            message: "No callable candidates found".to_string(),
            scheduled: 0,
        }));
    }

    let total = candidates.len();
    let scheduled = scheduler.schedule_batch(candidates).await.map_err(|e| {
        Json(ErrorResponse::new(
            format!("Failed to schedule calls: {}", e),
            "SCHEDULING_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
        ))
    })?;

    info!("Scheduled {}/{} candidate calls", scheduled, total);

    Ok(Json(InitiateCallsResponse {
        message: "Calls initiated successfully".to_string(),
        scheduled,
    }))
}

/// Vendor completion webhook. When a lifecycle is waiting on this call id the
/// event is handed over and the waiter runs analysis; otherwise (restart,
/// late webhook, or a call placed out of band) the analysis runs inline so
/// the outcome is never lost.
pub async fn webhook_handler(
    payload: Json<WebhookPayload>,
    ctx: &State<CallContext>,
) -> Json<WebhookResponse> {
    let payload = payload.into_inner();

    let call_id = match payload.call_id {
        Some(call_id) if !call_id.is_empty() => call_id,
        _ => {
            warn!("Webhook received without a call_id");
            return Json(WebhookResponse {
                message: "No call_id found".to_string(),
                call_id: None,
                phone_number: None,
                intent: "unknown".to_string(),
                summary: None,
            });
        }
    };

    info!(
        "Webhook received for call {} (status: {})",
        call_id,
        payload.status.as_deref().unwrap_or("unknown")
    );

    let event = WebhookEvent {
        call_id: call_id.clone(),
        status: payload.status,
        to: payload.to.clone(),
        summary: payload.summary.clone(),
    };

    if ctx.tracker.complete(event).await {
        return Json(WebhookResponse {
            message: "Webhook accepted".to_string(),
            call_id: Some(call_id),
            phone_number: payload.to,
            intent: "processing".to_string(),
            summary: payload.summary,
        });
    }

    // Nothing was waiting: analyze and persist right here.
    let intent = ctx.dialer.analyze_intent(&call_id).await;
    let summary = match payload.summary {
        Some(summary) => Some(summary),
        None => ctx.dialer.call_summary(&call_id).await,
    };

    let repo = CandidateRepository::new(ctx.db.pool());
    match repo
        .record_outcome(&call_id, intent.as_str(), summary.as_deref())
        .await
    {
        Ok(matched) => {
            if !matched {
                warn!("Webhook outcome for {} matched no candidate row", call_id);
            }
        }
        Err(e) => warn!("Failed to persist webhook outcome for {}: {}", call_id, e),
    }

    Json(WebhookResponse {
        message: "Webhook processed successfully".to_string(),
        call_id: Some(call_id),
        phone_number: payload.to,
        intent: intent.as_str().to_string(),
        summary,
    })
}
