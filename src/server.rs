//! HTTP surface
//!
//! `POST /api` runs one voice turn, `GET /health` answers liveness probes.
//! Providers are built once at startup and shared across requests; no other
//! state exists between requests.

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::{Config, SecretString};
use crate::providers::{
    http_client, CartesiaSynthesizer, ChatCompleter, DeepgramTranscriber, GroqChat, Synthesizer,
    Transcriber,
};
use crate::turn::handle_turn;

/// Shared, read-only provider handles.
#[derive(Clone)]
pub struct AppState {
    pub transcriber: Arc<dyn Transcriber>,
    pub completer: Arc<dyn ChatCompleter>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl AppState {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        completer: Arc<dyn ChatCompleter>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            transcriber,
            completer,
            synthesizer,
        }
    }

    /// Build the real providers. Fails if any API key is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let missing = config.missing_api_keys();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing API keys: {}. Set them in the environment, .env or config.toml",
                missing.join(", ")
            );
        }

        let client = http_client().context("Failed to build HTTP client")?;
        let key = |k: &Option<SecretString>| k.clone().unwrap_or_default();

        let transcriber = DeepgramTranscriber::from_config(
            &config.transcription,
            key(&config.transcription.api_key),
            client.clone(),
        );
        let completer = GroqChat::from_config(
            &config.completion,
            key(&config.completion.api_key),
            client.clone(),
        );
        let synthesizer = CartesiaSynthesizer::from_config(
            &config.synthesis,
            key(&config.synthesis.api_key),
            client,
        );

        tracing::debug!(
            "Providers ready: transcription={}, completion={} ({}), synthesis={}",
            config.transcription.base_url,
            config.completion.base_url,
            completer.model(),
            config.synthesis.base_url
        );

        Ok(Self::new(
            Arc::new(transcriber),
            Arc::new(completer),
            Arc::new(synthesizer),
        ))
    }
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route(
            "/api",
            post(handle_turn).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state, config.server.body_limit_bytes);

    let addr = config.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("  - POST http://{}/api", addr);
    tracing::info!("  - GET  http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested, draining connections");
}
