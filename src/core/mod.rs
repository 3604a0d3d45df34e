// src/core/mod.rs
//! Core infrastructure: configuration and database access.

pub mod config_manager;
pub mod database;

pub use config_manager::{
    ConfigManager, DialerConfig, ExtractionConfig, MailerConfig, TimingConfig,
};
pub use database::{Candidate, CandidateRepository, Database};
