// src/web/types.rs

use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct InitiateCallsResponse {
    pub message: String,
    pub scheduled: usize,
}

/// Completion notification posted by the calling vendor. The vendor sends
/// more fields than these; the rest are ignored.
#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct WebhookPayload {
    pub call_id: Option<String>,
    pub status: Option<String>,
    pub to: Option<String>,
    pub summary: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WebhookResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub intent: String,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationRequest {
    pub full_name: String,
    pub job_title: String,
    pub pay: String,
    pub location: String,
    pub work_experience: String,
    pub phone_number: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationResponse {
    pub success: bool,
    pub call_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct EmailRequest {
    pub full_name: String,
    pub phone_number: String,
    pub job_title: String,
    pub pay: String,
    pub location: String,
    pub call_id: String,
    pub intent: String,
    pub work_experience: String,
}

#[derive(FromForm)]
pub struct ResumeUploadForm<'f> {
    pub file: TempFile<'f>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ResumeResponse {
    pub status: String,
    pub candidate_id: Option<i64>,
    pub content: serde_json::Value,
    pub error: Option<String>,
}
