mod api;
mod orchestrator;

use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sqlab_core::config::SandboxConfig;
use sqlab_sandbox::{control_pool, ConnectionBroker, QueryEngine, QuestionStore, SchemaRegistry};

use api::AppState;
use orchestrator::SubmissionOrchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sqlab submission service");

    // Configuration: JSON file if given, the development profile otherwise,
    // environment overrides on top
    let mut config = match std::env::var("SQLAB_CONFIG") {
        Ok(path) => SandboxConfig::from_file(&path)?,
        Err(_) => SandboxConfig::for_development(),
    };
    config.apply_env()?;

    // Control-database components
    let pool = control_pool(&config)?;
    let registry = SchemaRegistry::new(pool.clone());
    registry.ensure_registry_tables().await?;
    let questions = QuestionStore::new(pool);

    // Submission pipeline
    let broker = ConnectionBroker::new(config.clone(), questions.clone());
    let engine = QueryEngine::new(config);
    let app_state = Arc::new(AppState {
        orchestrator: SubmissionOrchestrator::new(broker, engine),
        questions,
    });

    // Get API port from environment variable
    let port = std::env::var("SQLAB_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .map_err(|_| anyhow::anyhow!("SQLAB_PORT must be a valid port number"))?;

    // Create the main router
    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api::create_router(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run the API server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") }))
}
