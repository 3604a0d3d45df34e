// src/core/config_manager.rs
//! Unified configuration management - all runtime settings load from the
//! environment once at startup.

use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub dialer: DialerConfig,
    pub extraction: ExtractionConfig,
    pub mailer: Option<MailerConfig>,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DialerConfig {
    pub base_url: String,
    pub api_key: String,
    pub pathway_id: String,
    pub voice_id: Option<String>,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub from_address: String,
    pub to_address: String,
}

/// Timing constants for the call lifecycle. Defaults match the behavior the
/// service replaced: 5s poll interval, 45 attempts, 5 minute webhook wait,
/// calls staggered 5s apart.
#[derive(Debug, Clone, Copy)]
pub struct TimingConfig {
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
    pub webhook_wait_secs: u64,
    pub call_stagger_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            max_poll_attempts: 45,
            webhook_wait_secs: 300,
            call_stagger_secs: 5,
        }
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{} environment variable not set", name))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn optional_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .with_context(|| format!("{} must be a positive integer", name)),
        Err(_) => Ok(default),
    }
}

impl ConfigManager {
    /// Load all configurations
    pub fn load() -> Result<Self> {
        let server = ServerConfig {
            port: optional("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
        };

        let database = DatabaseConfig {
            url: required("DATABASE_URL")?,
        };

        let dialer = DialerConfig {
            base_url: optional("DIALER_BASE_URL", "https://api.bland.ai"),
            api_key: required("DIALER_API_KEY")?,
            pathway_id: required("PATHWAY_ID")?,
            voice_id: std::env::var("DIALER_VOICE_ID").ok(),
            webhook_url: std::env::var("WEBHOOK_URL").ok(),
        };

        let extraction = ExtractionConfig {
            api_url: optional(
                "EXTRACTION_API_URL",
                "https://api.openai.com/v1/chat/completions",
            ),
            api_key: required("OPENAI_API_KEY")?,
            model: optional("EXTRACTION_MODEL", "gpt-4o-mini"),
        };

        let mailer = Self::load_mailer();
        if mailer.is_none() {
            info!("Mailer configuration incomplete, email endpoints will report an error");
        }

        let defaults = TimingConfig::default();
        let timing = TimingConfig {
            poll_interval_secs: optional_u64("POLL_INTERVAL_SECS", defaults.poll_interval_secs)?,
            max_poll_attempts: optional_u64(
                "MAX_POLL_ATTEMPTS",
                defaults.max_poll_attempts as u64,
            )? as u32,
            webhook_wait_secs: optional_u64("WEBHOOK_WAIT_SECS", defaults.webhook_wait_secs)?,
            call_stagger_secs: optional_u64("CALL_STAGGER_SECS", defaults.call_stagger_secs)?,
        };

        Ok(Self {
            server,
            database,
            dialer,
            extraction,
            mailer,
            timing,
        })
    }

    /// Mailer credentials are optional: without them the service still
    /// places calls, it just cannot send application emails.
    fn load_mailer() -> Option<MailerConfig> {
        let tenant_id = std::env::var("GRAPH_TENANT_ID").ok()?;
        let client_id = std::env::var("GRAPH_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GRAPH_CLIENT_SECRET").ok()?;
        let from_address = std::env::var("FROM_EMAIL").ok()?;
        let to_address = std::env::var("HIRING_EMAIL").ok()?;

        Some(MailerConfig {
            tenant_id,
            client_id,
            client_secret,
            from_address,
            to_address,
        })
    }
}
