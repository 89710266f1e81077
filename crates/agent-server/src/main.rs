//! local-advisor HTTP Server
//!
//! Serves the recipe, demo and route pages and their JSON endpoints.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::LlmProvider;
use agent_runtime::OpenAiProvider;
use agent_server::{AppState, ServerConfig, log_filter, router};
use local_advisor::{ImageSearch, UnsplashClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before reading RUST_LOG
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter(|key| std::env::var(key).ok())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::info!("Loaded environment from {}", path.display());
    }
    let config = ServerConfig::from_env()?;

    // Initialize LLM provider
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::from_config(config.llm.clone())?);

    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to LLM gateway at {}", config.llm.base_url),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ LLM gateway not reachable at {} - requests will fail", config.llm.base_url);
        }
    }

    // Initialize photo search
    let image_search: Arc<dyn ImageSearch> = Arc::new(UnsplashClient::from_config(config.unsplash.clone())?);
    if image_search.is_configured() {
        tracing::info!("✓ Unsplash configured");
    } else {
        tracing::warn!("⚠ Unsplash not configured - image lists will be empty");
        tracing::warn!("  Set UNSPLASH_API_KEY in .env");
    }

    // Build application state
    let state = AppState::new(provider, image_search, &config.chain_model, &config.image_agent)?;
    tracing::info!("Chain model: {}", config.chain_model);
    tracing::info!("Image agent model: {}", config.image_agent.model);

    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 local-advisor server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                - Recipe page (with images)");
    tracing::info!("  POST /generate        - Recipe, time & cost, images");
    tracing::info!("  GET  /demo            - Recipe page");
    tracing::info!("  POST /demo/generate   - Recipe, time & cost");
    tracing::info!("  GET  /route           - Route page");
    tracing::info!("  POST /route/generate  - Route, stops, time & cost");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
