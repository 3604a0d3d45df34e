// src/web/handlers/resume_handlers.rs
//! Resume upload: parse the document, extract structured fields with the
//! LLM, and store a candidate row.

use anyhow::Result;
use rocket::form::Form;
use rocket::http::ContentType;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::CandidateRepository;
use crate::extraction::{document_text, FieldExtractor};
use crate::lifecycle::CallContext;
use crate::utils::get_file_extension;
use crate::web::types::{ErrorResponse, ResumeResponse, ResumeUploadForm};

pub async fn process_resume_handler(
    mut upload: Form<ResumeUploadForm<'_>>,
    extractor: &State<FieldExtractor>,
    ctx: &State<CallContext>,
) -> Result<Json<ResumeResponse>, Json<ErrorResponse>> {
    let raw_name = upload
        .file
        .raw_name()
        .and_then(|n| n.as_str())
        .unwrap_or("uploaded_resume")
        .to_string();

    let filename = resolved_filename(&raw_name, upload.file.content_type()).map_err(|e| {
        Json(ErrorResponse::new(
            e.to_string(),
            "UNSUPPORTED_FORMAT".to_string(),
            vec![
                "Upload a PDF file (.pdf)".to_string(),
                "Upload a plain text file (.txt, .md)".to_string(),
            ],
        ))
    })?;

    info!("Resume upload received: {}", filename);

    let temp_path = std::env::temp_dir().join(format!("resume_{}_{}", Uuid::new_v4(), filename));

    upload.file.persist_to(&temp_path).await.map_err(|e| {
        Json(ErrorResponse::new(
            format!("Failed to store uploaded file: {}", e),
            "UPLOAD_FAILED".to_string(),
            vec!["Try uploading the file again".to_string()],
        ))
    })?;

    let result = process_resume(&filename, &temp_path, extractor, ctx).await;

    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        warn!("Failed to remove temporary resume file: {}", e);
    }

    result
}

/// Recover a filename with a usable extension. Multipart file names arrive
/// sanitized with the extension stripped, so the extension has to come back
/// from the declared content type when the name alone does not carry one.
fn resolved_filename(raw_name: &str, content_type: Option<&ContentType>) -> Result<String> {
    if get_file_extension(raw_name).is_some() {
        return Ok(raw_name.to_string());
    }

    let is_pdf = content_type.map_or(false, |ct| ct.is_pdf());
    let is_text = content_type.map_or(false, |ct| ct.is_text() || ct.is_markdown());

    if is_pdf {
        Ok(format!("{}.pdf", raw_name))
    } else if is_text {
        Ok(format!("{}.txt", raw_name))
    } else {
        let received = content_type
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        anyhow::bail!(
            "Could not determine resume format (content type: {})",
            received
        )
    }
}

async fn process_resume(
    filename: &str,
    path: &std::path::Path,
    extractor: &State<FieldExtractor>,
    ctx: &State<CallContext>,
) -> Result<Json<ResumeResponse>, Json<ErrorResponse>> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        Json(ErrorResponse::new(
            format!("Failed to read uploaded file: {}", e),
            "UPLOAD_FAILED".to_string(),
            vec!["Try uploading the file again".to_string()],
        ))
    })?;

    let text = document_text(filename, &bytes).map_err(|e| {
        Json(ErrorResponse::new(
            e.to_string(),
            "UNSUPPORTED_FORMAT".to_string(),
            vec![
                "Upload a PDF file (.pdf)".to_string(),
                "Upload a plain text file (.txt, .md)".to_string(),
            ],
        ))
    })?;

    let mut fields = extractor.extract_fields(&text).await.map_err(|e| {
        Json(ErrorResponse::new(
            format!("Field extraction failed: {}", e),
            "EXTRACTION_FAILED".to_string(),
            vec!["Try again in a few moments".to_string()],
        ))
    })?;

    canonicalize_field_names(&mut fields);

    // Storage failure does not lose the extraction; the fields still go back
    // to the caller.
    let repo = CandidateRepository::new(ctx.db.pool());
    let candidate_id = match repo.insert_extracted(&fields).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Failed to store extracted candidate: {}", e);
            None
        }
    };

    Ok(Json(ResumeResponse {
        status: "success".to_string(),
        candidate_id,
        content: Value::Object(fields),
        error: None,
    }))
}

/// Map extraction keys onto the column names the calling pipeline reads.
fn canonicalize_field_names(fields: &mut Map<String, Value>) {
    for (from, to) in [("name", "full_name"), ("phone", "phone_numbers")] {
        if let Some(value) = fields.remove(from) {
            fields.entry(to.to_string()).or_insert(value);
        }
    }
}
