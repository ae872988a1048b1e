use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_core::narrative::NarrativeTable;
use vigil_pipeline::Pipeline;

use vigil_api::config::ServerConfig;
use vigil_api::router::build_app_router;
use vigil_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vigil_api=debug,vigil_pipeline=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = ?config.pipeline.model.backend,
        frame_count = config.pipeline.frame_count,
        frame_size = config.pipeline.frame_size,
        "Loaded server configuration"
    );

    // --- Narratives ---
    let narratives = match &config.narratives_path {
        Some(path) => {
            let table = NarrativeTable::builtin_with_overrides(path)
                .unwrap_or_else(|e| panic!("Failed to load narratives: {e}"));
            tracing::info!(path = %path.display(), "Narrative overrides loaded");
            table
        }
        None => NarrativeTable::builtin(),
    };

    // --- Pipeline (loads the model once) ---
    let pipeline = Pipeline::from_config(&config.pipeline, Arc::new(narratives));
    if !pipeline.is_model_loaded() {
        tracing::error!("Serving without a model; /analyze-video will return MODEL_UNAVAILABLE");
    }

    // --- App state ---
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
