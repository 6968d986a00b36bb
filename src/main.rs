use std::sync::Arc;

use anyhow::Context;
use chat_proxy::{config::Config, routes, services::completion::GroqClient, state::AppState};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let mut http = reqwest::Client::builder();
    if let Some(timeout) = config.upstream_timeout {
        http = http.timeout(timeout);
    }
    let http = http.build().context("failed to build HTTP client")?;

    let groq = GroqClient::new(http, &config.api_key, &config.api_base)
        .context("failed to configure model client")?;
    info!(endpoint = %groq.endpoint(), model = groq.model(), "model client ready");

    let state = Arc::new(AppState::new(Arc::new(groq)));

    let app = routes::create_router()
        .with_state(state)
        .layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("chat proxy listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
