use std::sync::Arc;

use tracing::info;

use voice_chat_relay::agent::GeminiAgentService;
use voice_chat_relay::build_router;
use voice_chat_relay::config::RelayConfig;
use voice_chat_relay::service::pacer::Pacer;
use voice_chat_relay::service::relay_service::RelayService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_chat_relay=debug,tower_http=debug".into()),
        )
        .init();

    let config = RelayConfig::from_env()?;

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let agent = GeminiAgentService::new(&config)?;
    let relay = RelayService::new(
        Arc::new(agent),
        Pacer::per_second(config.rate_limit_per_second),
        config.max_message_chars,
    );
    info!(
        "Relaying to model {} at {} (max {} chars, {} calls/s)",
        config.model, config.api_base_url, config.max_message_chars, config.rate_limit_per_second
    );

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, build_router(relay)).await?;
    Ok(())
}
