// src/extraction/parser.rs
//! Resume document parsing - turn an uploaded file into plain text for the
//! extraction model.

use anyhow::{Context, Result};

use crate::utils::get_file_extension;

/// Extract the text content of an uploaded resume. PDF and plain text are
/// supported; anything else is rejected with the extension named.
pub fn document_text(filename: &str, bytes: &[u8]) -> Result<String> {
    let extension = get_file_extension(filename).unwrap_or_default();

    match extension.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .with_context(|| format!("Failed to extract text from PDF: {}", filename)),
        "txt" | "text" | "md" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        other => anyhow::bail!(
            "Unsupported resume format: '{}' (supported: pdf, txt, md)",
            other
        ),
    }
}
