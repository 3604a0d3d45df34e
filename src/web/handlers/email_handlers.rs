// src/web/handlers/email_handlers.rs
//! Application notification email endpoint.

use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

use crate::mailer::{ApplicationDetails, GraphMailer};
use crate::web::types::{EmailRequest, ErrorResponse, MessageResponse};

pub async fn send_email_handler(
    request: Json<EmailRequest>,
    mailer: &State<Option<GraphMailer>>,
) -> Result<Json<MessageResponse>, Json<ErrorResponse>> {
    let mailer = mailer.inner().as_ref().ok_or_else(|| {
        Json(ErrorResponse::new(
            "Email configuration is incomplete".to_string(),
            "MAILER_NOT_CONFIGURED".to_string(),
            vec![
                "Set GRAPH_TENANT_ID, GRAPH_CLIENT_ID, GRAPH_CLIENT_SECRET, FROM_EMAIL and HIRING_EMAIL".to_string(),
            ],
        ))
    })?;

    let request = request.into_inner();
    let details = ApplicationDetails {
        full_name: request.full_name,
        phone_number: request.phone_number,
        job_title: request.job_title,
        pay: request.pay,
        location: request.location,
        call_id: request.call_id,
        intent: request.intent,
        work_experience: request.work_experience,
    };

    mailer.send_application_email(&details).await.map_err(|e| {
        error!("Failed to send application email: {}", e);
        Json(ErrorResponse::new(
            format!("Failed to send email: {}", e),
            "EMAIL_FAILED".to_string(),
            vec!["Try again in a few moments".to_string()],
        ))
    })?;

    Ok(Json(MessageResponse {
        message: "Email sent successfully".to_string(),
    }))
}
