// src/dialer/client.rs
//! HTTP client for the vendor calling API.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, warn};

use super::types::{
    AnalyzeRequest, AnalyzeResponse, CallCreated, CallDetails, CallScript, Intent, OutboundCall,
};
use crate::core::DialerConfig;

const CALLS_ENDPOINT: &str = "/v1/calls";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct DialerClient {
    client: Client,
    base_url: String,
    api_key: String,
    pathway_id: String,
    voice_id: Option<String>,
    webhook_url: Option<String>,
}

impl DialerClient {
    pub fn new(config: &DialerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            pathway_id: config.pathway_id.clone(),
            voice_id: config.voice_id.clone(),
            webhook_url: config.webhook_url.clone(),
        })
    }

    /// Place an outbound call and return the vendor call id.
    pub async fn place_call(&self, phone_number: &str, script: CallScript) -> Result<String> {
        let url = format!("{}{}", self.base_url, CALLS_ENDPOINT);

        let payload = OutboundCall {
            phone_number: phone_number.to_string(),
            pathway_id: self.pathway_id.clone(),
            voice: self.voice_id.clone(),
            pronunciation_guide: json!({ "$": "dollars" }),
            wait_for_greeting: true,
            noise_cancellation: true,
            webhook: self.webhook_url.clone(),
            request_data: script,
        };

        info!(
            "Placing call to {} for {}",
            phone_number, payload.request_data.full_name
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to send call request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Call initiation failed: {} {}", status, error_text);
            anyhow::bail!("Call initiation failed with status {}: {}", status, error_text);
        }

        let created: CallCreated = response
            .json()
            .await
            .context("Failed to parse call creation response")?;

        created.call_id.ok_or_else(|| {
            anyhow::anyhow!(
                "Call accepted but no call_id returned: {}",
                created.message.unwrap_or_default()
            )
        })
    }

    /// Fetch the vendor-side call record by id.
    pub async fn fetch_call(&self, call_id: &str) -> Result<CallDetails> {
        let url = format!("{}{}/{}", self.base_url, CALLS_ENDPOINT, call_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Failed to fetch call details")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Call fetch failed with status {}: {}", status, error_text);
        }

        response
            .json::<CallDetails>()
            .await
            .context("Failed to parse call details response")
    }

    /// Run the post-call intent analysis. Transport or API failures map to
    /// `Intent::Error` rather than propagating; a call whose analysis failed
    /// still gets its outcome persisted.
    pub async fn analyze_intent(&self, call_id: &str) -> Intent {
        let url = format!("{}{}/{}/analyze", self.base_url, CALLS_ENDPOINT, call_id);

        let result = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&AnalyzeRequest::intent())
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!("Intent analysis request failed for {}: {}", call_id, e);
                return Intent::Error;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                "Intent analysis for {} returned {}: {}",
                call_id, status, error_text
            );
            return Intent::Error;
        }

        match response.json::<AnalyzeResponse>().await {
            Ok(parsed) => Intent::from_answers(&parsed),
            Err(e) => {
                error!("Failed to parse analysis response for {}: {}", call_id, e);
                Intent::Error
            }
        }
    }

    /// Fetch the call summary, tolerating failures: a missing summary is not
    /// a reason to drop the rest of the outcome.
    pub async fn call_summary(&self, call_id: &str) -> Option<String> {
        match self.fetch_call(call_id).await {
            Ok(details) => details.summary,
            Err(e) => {
                warn!("Failed to fetch summary for {}: {}", call_id, e);
                None
            }
        }
    }
}
