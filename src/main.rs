use anyhow::Result;
use call_orchestrator::core::ConfigManager;
use call_orchestrator::start_web_server;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    Registry::default()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("call_orchestrator=info,rocket=warn")),
        )
        .init();

    let config = ConfigManager::load()?;

    info!("Starting call orchestration server");
    info!("Server: http://0.0.0.0:{}", config.server.port);
    info!("Dialer: {}", config.dialer.base_url);
    info!("Extraction model: {}", config.extraction.model);
    info!(
        "Mailer: {}",
        if config.mailer.is_some() {
            "configured"
        } else {
            "disabled"
        }
    );

    start_web_server(config).await
}
