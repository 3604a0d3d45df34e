pub mod core;
pub mod dialer;
pub mod extraction;
pub mod lifecycle;
pub mod mailer;
pub mod scheduler;
pub mod utils;
pub mod web;

pub use web::start_web_server;
