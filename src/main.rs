mod app;
mod errors;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::logging::LoggingConfig;
use crate::services::intent_service::IntentAnalyzer;
use crate::services::llm_service::{LlmConfig, LlmProvider, OpenAiProvider};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    logging::init_logging(LoggingConfig::from_env())?;

    // A missing credential is fatal at startup, not a per-request error.
    let llm_config = LlmConfig::from_env()?;

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(llm_config));
    let state = AppState {
        analyzer: Arc::new(IntentAnalyzer::new(provider)),
    };

    let allowed_origin =
        std::env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let app = app::create_app(state, &allowed_origin);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Financial intent backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
