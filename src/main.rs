use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use genai_gateway::cache::CacheStore;
use genai_gateway::state::AppState;
use genai_gateway::{Args, GenerationService, ProviderRouter, Settings, handlers, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let settings = Settings::from_args(args).context("invalid configuration")?;
    logging::init(&settings.log_level, settings.log_json);

    // one client shared by every backend
    let client = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;

    let router = ProviderRouter::new(&settings, client);
    let cache = CacheStore::connect(&settings.cache).await;
    let service = GenerationService::new(router, cache, settings.cache.ttl);

    let port = settings.port;
    let state = Arc::new(AppState::new(settings, service));
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %addr, "gateway listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
