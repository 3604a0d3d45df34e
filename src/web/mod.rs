// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Request, Response, State};
use std::sync::Arc;
use tracing::info;

use crate::core::{ConfigManager, Database};
use crate::dialer::DialerClient;
use crate::extraction::FieldExtractor;
use crate::lifecycle::{CallContext, WebhookTracker};
use crate::mailer::GraphMailer;
use crate::scheduler::CallScheduler;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// API Routes

#[post("/initiate-calls")]
pub async fn initiate_calls(
    ctx: &State<CallContext>,
    scheduler: &State<CallScheduler>,
) -> Result<Json<InitiateCallsResponse>, Json<ErrorResponse>> {
    handlers::initiate_calls_handler(ctx, scheduler).await
}

#[post("/webhook", data = "<payload>")]
pub async fn webhook(
    payload: Json<WebhookPayload>,
    ctx: &State<CallContext>,
) -> Json<WebhookResponse> {
    handlers::webhook_handler(payload, ctx).await
}

#[post("/submit-job-application", data = "<request>")]
pub async fn submit_job_application(
    request: Json<ApplicationRequest>,
    ctx: &State<CallContext>,
) -> Result<Json<ApplicationResponse>, Json<ErrorResponse>> {
    handlers::submit_job_handler(request, ctx).await
}

#[post("/send_email", data = "<request>")]
pub async fn send_email(
    request: Json<EmailRequest>,
    mailer: &State<Option<GraphMailer>>,
) -> Result<Json<MessageResponse>, Json<ErrorResponse>> {
    handlers::send_email_handler(request, mailer).await
}

#[post("/not_interested", data = "<request>")]
pub async fn not_interested(request: Json<EmailRequest>) -> Json<MessageResponse> {
    handlers::not_interested_handler(request).await
}

#[post("/process-resume", data = "<upload>")]
pub async fn process_resume(
    upload: Form<ResumeUploadForm<'_>>,
    extractor: &State<FieldExtractor>,
    ctx: &State<CallContext>,
) -> Result<Json<ResumeResponse>, Json<ErrorResponse>> {
    handlers::process_resume_handler(upload, extractor, ctx).await
}

#[get("/health")]
pub async fn health(
    ctx: &State<CallContext>,
) -> Result<Json<MessageResponse>, Json<ErrorResponse>> {
    handlers::health_handler(ctx).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let db = Database::connect(&config.database.url).await?;
    let dialer = DialerClient::new(&config.dialer)?;
    let tracker = Arc::new(WebhookTracker::new());

    let ctx = CallContext {
        db,
        dialer,
        tracker,
        timing: config.timing,
    };

    let scheduler = CallScheduler::start(ctx.clone()).await?;
    let extractor = FieldExtractor::new(&config.extraction)?;

    let mailer = match config.mailer {
        Some(mailer_config) => Some(GraphMailer::new(mailer_config)?),
        None => None,
    };

    info!("Starting call orchestration API server");
    info!("Listening on port {}", config.server.port);

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", "0.0.0.0"));

    let _rocket = rocket::custom(figment)
        .attach(Cors)
        .manage(ctx)
        .manage(scheduler)
        .manage(extractor)
        .manage(mailer)
        .register("/", catchers![bad_request, internal_error])
        .mount(
            "/",
            routes![
                initiate_calls,
                webhook,
                submit_job_application,
                send_email,
                not_interested,
                process_resume,
                health,
                options,
            ],
        )
        .launch()
        .await;

    Ok(())
}
