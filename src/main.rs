//! BookPost Server
//!
//! Upload a photographed book page, OCR it against a pluggable vision
//! backend, segment the transcript into stably-ordered paragraphs, and
//! annotate them with ideas and underlines.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookpost_server::config::Config;
use bookpost_server::pipeline::UploadPipeline;
use bookpost_server::segment::{Segmenter, SegmenterConfig};
use bookpost_server::state::AppState;
use bookpost_server::{db, ocr, routes};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookpost_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting BookPost Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.database.url);

    // Initialize database
    let pool = db::create_pool(&config.database.url)
        .await
        .expect("Failed to initialize database");
    tracing::info!("Database initialized");

    // Pick the OCR backend once at startup and wire the pipeline
    let extractor = ocr::select_extractor(&config.ocr);
    let segmenter = Segmenter::new(SegmenterConfig {
        min_paragraph_len: config.segmenter.min_paragraph_len,
    });
    let pipeline = Arc::new(UploadPipeline::new(
        extractor,
        segmenter,
        config.segmenter.title_max_len,
        config.ocr.timeout_secs,
    ));

    let state = AppState::new(pool, pipeline);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .expect("Invalid server address");
    tracing::info!("BookPost Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
