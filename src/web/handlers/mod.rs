// src/web/handlers/mod.rs
//! Handler modules for the web API

pub mod application_handlers;
pub mod call_handlers;
pub mod email_handlers;
pub mod resume_handlers;
pub mod system_handlers;

pub use application_handlers::*;
pub use call_handlers::*;
pub use email_handlers::*;
pub use resume_handlers::*;
pub use system_handlers::*;
