// src/web/handlers/system_handlers.rs
//! Health and service status handlers

use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

use crate::lifecycle::CallContext;
use crate::web::types::{ErrorResponse, MessageResponse};

pub async fn health_handler(
    ctx: &State<CallContext>,
) -> Result<Json<MessageResponse>, Json<ErrorResponse>> {
    if let Err(e) = ctx.db.health_check().await {
        error!("Health check failed: {}", e);
        return Err(Json(ErrorResponse::new(
            "Database unavailable".to_string(),
            "UNHEALTHY".to_string(),
            vec!["Check the DATABASE_URL and database availability".to_string()],
        )));
    }

    Ok(Json(MessageResponse {
        message: "Service is healthy".to_string(),
    }))
}
