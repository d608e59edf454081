/*****************************************************************************************
 *
 *  postbox – two-listener message board
 *  ------------------------------------
 *
 *  HTTP front end (form posts) → UDP datagram → receiver → JSON store
 *
 *****************************************************************************************/

mod app;
mod config;
mod errors;
mod routes;
mod services;
mod storage;
mod state;

use std::sync::Arc;

use tokio::net::TcpListener;
use axum::serve;

use tracing_subscriber::FmtSubscriber;
use tracing::level_filters::LevelFilter;

use crate::config::AppConfig;
use crate::errors::BoardError;
use crate::services::datagram_service::{bind_receiver, run_receiver};
use crate::state::AppState;
use crate::storage::Storage;

#[tokio::main]
async fn main() -> Result<(), BoardError> {
    //
    // ────────────────────────────────────────────────────────
    //  Load configuration (config.json or built-in defaults)
    // ────────────────────────────────────────────────────────
    //
    let config_path = AppConfig::locate();
    let cfg = match &config_path {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    let level = match cfg.log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info"  => LevelFilter::INFO,
        "warn"  => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }

    match &config_path {
        Some(path) => tracing::info!("Loaded config.json from {}", path.display()),
        None => tracing::info!("No config.json found, using defaults"),
    }
    tracing::info!("Configuration: {:?}", cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Start the datagram receiver (never joined)
    // ────────────────────────────────────────────────────────
    //
    let storage = Arc::new(Storage::new(cfg.storage_path.clone()));
    match storage.load().await {
        Ok(store) => tracing::info!(
            "Storing messages in {} ({} stored so far)",
            storage.path().display(),
            store.len()
        ),
        Err(e) => tracing::warn!("Store at {} is unreadable: {e}", storage.path().display()),
    }

    let socket = bind_receiver(cfg.datagram_addr).await?;
    tokio::spawn(run_receiver(socket, storage, cfg.max_datagram_size));

    //
    // ────────────────────────────────────────────────────────
    //  Bind HTTP server and start listening
    // ────────────────────────────────────────────────────────
    //
    let addr = cfg.http_addr;
    let app = app::build_app(AppState::new(cfg));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Starting HTTP server on http://{}", addr);

    serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

//
// ─────────────────────────────────────────────────────────────
//  Graceful shutdown handler
//
//  Only the HTTP listener is closed; the receiver task ends with the process.
// ─────────────────────────────────────────────────────────────
//
async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    tracing::warn!("CTRL+C received, shutting down HTTP server");
}
