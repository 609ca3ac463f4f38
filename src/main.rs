//! Blind OCR Server
//!
//! A self-hosted OCR API for PDFs and images with a request log and a small
//! admin view.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blind_ocr_server::auth::StaticCredentials;
use blind_ocr_server::config::Config;
use blind_ocr_server::db;
use blind_ocr_server::ocr::{build_provider, MupdfRasterizer, TextExtractor};
use blind_ocr_server::routes;
use blind_ocr_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "blind_ocr_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Blind OCR Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "OCR provider: {:?}, language: {}, render scale: {}",
        config.ocr.provider,
        config.ocr.language,
        config.ocr.render_scale
    );

    // Initialize database
    let db_pool = db::create_pool(&config.database)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database.url))?;
    tracing::info!("Database initialized at {}", config.database.url);

    // OCR engine
    let provider = build_provider(&config.ocr);
    if !provider.is_available().await {
        tracing::warn!(
            "{:?} OCR provider is not reachable; uploads will fail until it is",
            provider.provider_type()
        );
    }
    let rasterizer = Arc::new(MupdfRasterizer::new(config.ocr.render_scale));
    let extractor = TextExtractor::new(rasterizer, provider, &config.ocr.language);

    // Admin credentials
    let credentials = StaticCredentials::from_config(&config.admin);
    tracing::info!(
        "Admin user '{}' configured (credential tag {}...)",
        config.admin.username,
        credentials.fingerprint()
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid SERVER_HOST/SERVER_PORT")?;

    let app_state = AppState::new(config, db_pool.clone(), extractor, Arc::new(credentials));
    let app = routes::app(app_state);

    // Start server with graceful shutdown
    tracing::info!("Blind OCR Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
