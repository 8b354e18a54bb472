use std::sync::Arc;

use relay_api::ai::gemini::GeminiClient;
use relay_api::server::{self, AppState};
use relay_api::{AppConfig, Orchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();
    if config.gemini_api_key.is_empty() {
        log::warn!("GEMINI_API_KEY not set; analysis endpoints will serve fallback responses");
    }

    let capability = Arc::new(GeminiClient::new(&config));
    let orchestrator = Arc::new(Orchestrator::new(capability));
    let app = server::router(AppState { orchestrator });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("relay-api listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
