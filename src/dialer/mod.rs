// src/dialer/mod.rs
//! Vendor calling API: call placement, record lookup, and post-call intent
//! analysis.

pub mod client;
pub mod types;

pub use client::DialerClient;
pub use types::{AnalyzeResponse, CallDetails, CallScript, Intent};
