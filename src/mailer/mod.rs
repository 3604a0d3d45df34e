// src/mailer/mod.rs
//! Application notification emails over the Microsoft Graph API.
//!
//! Uses the client-credentials flow: acquire an app-only token from the
//! tenant, then post to the sender's `sendMail` action. Graph acknowledges a
//! queued message with 202.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::core::MailerConfig;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Everything the hiring team needs to know about one application.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationDetails {
    pub full_name: String,
    pub phone_number: String,
    pub job_title: String,
    pub pay: String,
    pub location: String,
    pub call_id: String,
    pub intent: String,
    pub work_experience: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

#[derive(Clone)]
pub struct GraphMailer {
    client: Client,
    config: MailerConfig,
}

impl GraphMailer {
    pub fn new(config: MailerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    async fn acquire_token(&self) -> Result<String> {
        let url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.config.tenant_id
        );

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
            ])
            .send()
            .await
            .context("Token request failed")?;

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        token.access_token.ok_or_else(|| {
            anyhow::anyhow!(
                "Token acquisition failed: {}",
                token
                    .error_description
                    .unwrap_or_else(|| "no error description".to_string())
            )
        })
    }

    /// Send the application notification to the hiring address.
    pub async fn send_application_email(&self, details: &ApplicationDetails) -> Result<()> {
        let token = self.acquire_token().await?;

        let url = format!(
            "https://graph.microsoft.com/v1.0/users/{}/sendMail",
            self.config.from_address
        );

        let payload = json!({
            "message": {
                "subject": format!("New Job Application: {}", details.job_title),
                "body": {
                    "contentType": "Text",
                    "content": application_email_body(details),
                },
                "toRecipients": [
                    { "emailAddress": { "address": self.config.to_address } }
                ],
            },
            "saveToSentItems": true,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .context("sendMail request failed")?;

        let status = response.status();
        if status.as_u16() != 202 {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("sendMail returned {}: {}", status, error_text);
        }

        info!(
            "Application email for {} queued to {}",
            details.full_name, self.config.to_address
        );
        Ok(())
    }
}

fn application_email_body(details: &ApplicationDetails) -> String {
    format!(
        r#"Dear Hiring Manager,

A new job application has been received.

APPLICANT INFORMATION
---------------------
Full Name: {}
Phone Number: {}

APPLICATION DETAILS
-------------------
Position Applied For: {}
Expected Salary: {}
Preferred Location: {}
Work Experience: {}
Call ID: {}
Candidate Intent: {}

Best regards,
Automated Application System
"#,
        details.full_name,
        details.phone_number,
        details.job_title,
        details.pay,
        details.location,
        details.work_experience,
        details.call_id,
        details.intent,
    )
}
