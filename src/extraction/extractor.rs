// src/extraction/extractor.rs
//! LLM-backed structured field extraction from resume text.

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::core::ExtractionConfig;

const SYSTEM_PROMPT: &str = r#"You are an intelligent information extraction assistant specialized in analyzing resumes, profiles, and professional documents. Your task is to extract structured data from the text content of the document.

Your output must always be in the following JSON format:
```json
{
  "name": "<Full Name>",
  "job_title": "<Current or Most Recent Job Title>",
  "location": "<City, State/Country if available>",
  "email": "<Email Address if available>",
  "phone": "<Phone Number if available>",
  "linkedin": "<LinkedIn Profile URL if available>",
  "total_work_experience": "<Calculated Total Work Experience in years>",
  "summary": "<Work Experience Summary like what you would find in a resume>"
}
```"#;

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct FieldExtractor {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl FieldExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Send the resume text through the extraction model and return the
    /// parsed field map.
    pub async fn extract_fields(&self, resume_text: &str) -> Result<Map<String, Value>> {
        let payload = json!({
            "model": self.model,
            "temperature": 0.7,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": resume_text },
            ],
        });

        info!(
            "Requesting field extraction ({} chars of resume text)",
            resume_text.len()
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to send extraction request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Extraction request failed with status {}: {}", status, error_text);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse extraction response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .context("Extraction model returned no content")?;

        let mut fields = extract_json_from_content(&content);
        normalize_work_experience(&mut fields);
        Ok(fields)
    }
}

/// Pull a JSON object out of the model output. Fenced code blocks are tried
/// first, then the whole body; unparseable output is wrapped under a
/// `raw_content` key rather than dropped.
pub fn extract_json_from_content(content: &str) -> Map<String, Value> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE
        .get_or_init(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("valid regex literal"));

    if let Some(captures) = fence.captures(content) {
        if let Some(block) = captures.get(1) {
            match serde_json::from_str::<Value>(block.as_str()) {
                Ok(Value::Object(map)) => return map,
                Ok(_) | Err(_) => {
                    warn!("Fenced block in extraction output was not a JSON object");
                }
            }
        }
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(content) {
        return map;
    }

    warn!("Extraction output was not JSON, wrapping raw content");
    let mut map = Map::new();
    map.insert(
        "raw_content".to_string(),
        Value::String(content.to_string()),
    );
    map
}

/// Make `total_work_experience` read as a duration ("7" becomes "7 years").
fn normalize_work_experience(fields: &mut Map<String, Value>) {
    if let Some(value) = fields.get_mut("total_work_experience") {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return,
        };
        if !text.is_empty() && !text.to_lowercase().ends_with("years") {
            *value = Value::String(format!("{} years", text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_block() {
        let content = "Here you go:\n```json\n{\"name\": \"Jane Doe\", \"phone\": \"5551234567\"}\n```";
        let map = extract_json_from_content(content);
        assert_eq!(map.get("name").and_then(Value::as_str), Some("Jane Doe"));
    }

    #[test]
    fn test_extract_json_from_unfenced_body() {
        let map = extract_json_from_content("{\"job_title\": \"Engineer\"}");
        assert_eq!(
            map.get("job_title").and_then(Value::as_str),
            Some("Engineer")
        );
    }

    #[test]
    fn test_extract_json_wraps_non_json() {
        let map = extract_json_from_content("I could not read the resume.");
        assert_eq!(
            map.get("raw_content").and_then(Value::as_str),
            Some("I could not read the resume.")
        );
    }

    #[test]
    fn test_normalize_work_experience_appends_years() {
        let mut map = Map::new();
        map.insert(
            "total_work_experience".to_string(),
            Value::String("7".to_string()),
        );
        normalize_work_experience(&mut map);
        assert_eq!(
            map.get("total_work_experience").and_then(Value::as_str),
            Some("7 years")
        );
    }

    #[test]
    fn test_normalize_work_experience_keeps_existing_suffix() {
        let mut map = Map::new();
        map.insert(
            "total_work_experience".to_string(),
            Value::String("10 Years".to_string()),
        );
        normalize_work_experience(&mut map);
        assert_eq!(
            map.get("total_work_experience").and_then(Value::as_str),
            Some("10 Years")
        );
    }

    #[test]
    fn test_normalize_work_experience_handles_numbers() {
        let mut map = Map::new();
        map.insert("total_work_experience".to_string(), json!(3));
        normalize_work_experience(&mut map);
        assert_eq!(
            map.get("total_work_experience").and_then(Value::as_str),
            Some("3 years")
        );
    }
}
