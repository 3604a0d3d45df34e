// src/web/handlers/application_handlers.rs
//! Direct job application submissions: place a call immediately and collect
//! the result in the background.

use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::dialer::CallScript;
use crate::lifecycle::{collect_detached_result, CallContext};
use crate::utils::{normalize_pay, normalize_phone};
use crate::web::types::{
    ApplicationRequest, ApplicationResponse, EmailRequest, ErrorResponse, MessageResponse,
};

pub async fn submit_job_handler(
    request: Json<ApplicationRequest>,
    ctx: &State<CallContext>,
) -> Result<Json<ApplicationResponse>, Json<ErrorResponse>> {
    let request = request.into_inner();

    let phone = normalize_phone(&request.phone_number).ok_or_else(|| {
        Json(ErrorResponse::new(
            format!("Could not normalize phone number: {}", request.phone_number),
            "INVALID_PHONE".to_string(),
            vec![
                "Provide a 10-digit US number or an E.164 number".to_string(),
            ],
        ))
    })?;

    let script = CallScript {
        user_name: request.full_name.clone(),
        full_name: request.full_name.clone(),
        job_title: request.job_title.clone(),
        location: request.location.clone(),
        pay: normalize_pay(&request.pay),
        phone_number: Some(phone.clone()),
        work_experience: Some(request.work_experience.clone()),
    };

    let call_id = ctx.dialer.place_call(&phone, script).await.map_err(|e| {
        Json(ErrorResponse::new(
            format!("Failed to place call: {}", e),
            "CALL_FAILED".to_string(),
            vec!["Try again in a few moments".to_string()],
        ))
    })?;

    info!(
        "Application call {} placed for {} ({})",
        call_id, request.full_name, phone
    );

    // Result collection runs in the background; the caller only needs the id.
    tokio::spawn(collect_detached_result(
        ctx.inner().clone(),
        call_id.clone(),
    ));

    Ok(Json(ApplicationResponse {
        success: true,
        call_id,
        message: "Call initiated".to_string(),
    }))
}

pub async fn not_interested_handler(request: Json<EmailRequest>) -> Json<MessageResponse> {
    let request = request.into_inner();
    info!(
        "Candidate not interested: call {} for {}",
        request.call_id, request.job_title
    );
    Json(MessageResponse {
        message: "User is not interested in the job.".to_string(),
    })
}
