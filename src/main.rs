//! Nexta - Gulf-dialect chat and voice assistant backend
//!
//! Proxies chat, transcription and speech requests to remote AI providers
//! and keeps one shared conversation history in a local JSON file.

mod api;
mod assembler;
mod config;
mod history;
mod llm;
mod orchestrator;
mod postprocess;

#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use config::Config;
use history::HistoryStore;
use llm::Providers;
use orchestrator::ResponseOrchestrator;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexta=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env()?;

    // Initialize providers
    let providers = Providers::from_config(&config)?;
    tracing::info!(
        model = %providers.completion.model_id(),
        speech = providers.speech.provider(),
        temperature = config.completion.temperature,
        max_tokens = config.completion.max_tokens,
        "Providers initialized"
    );

    // Initialize history and rewrite it in normalized form
    let history = Arc::new(HistoryStore::new(&config.history_path));
    let store = history.load().await;
    if let Err(e) = history.save(&store).await {
        tracing::warn!(error = %e, "Could not rewrite history file, continuing");
    }
    tracing::info!(
        path = %history.path().display(),
        entries = store.default_entries().len(),
        "History ready"
    );

    // Create application state
    let orchestrator = ResponseOrchestrator::new(history, providers, config.completion.clone());
    let state = AppState::new(orchestrator);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Nexta server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
