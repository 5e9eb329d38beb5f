use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

mod auth;
mod categories;
mod config;
mod controllers;
mod db;
mod device;
mod models;
mod routing;
mod views;

use categories::CategoryGraphUpdater;
use config::Config;
use db::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub started_at: Instant,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    log::info!("wiki-backend v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    log::info!("Initializing database at {}", config.database_url);
    let db = match Database::new(&config.database_url) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            log::error!("Failed to initialize database: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    let cancel = CancellationToken::new();
    log::info!(
        "Starting category updater (interval {:?})",
        config.category_update_interval
    );
    let updater = CategoryGraphUpdater::new(Arc::clone(&db), config.category_update_interval)
        .spawn(cancel.clone());

    let port = config.port;
    log::info!("Serving '{}' on port {}", config.site_title, port);

    let state = web::Data::new(AppState {
        db,
        config,
        started_at: Instant::now(),
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(controllers::configure)
    })
    .bind(("0.0.0.0", port))?
    .run();

    let server_handle = server.handle();
    let shutdown = cancel.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        log::info!("Received Ctrl+C, shutting down...");

        shutdown.cancel();

        log::info!("Stopping HTTP server...");
        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(Duration::from_secs(5), server_stop).await.is_err() {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }
    });

    let result = server.await;

    cancel.cancel();
    if tokio::time::timeout(Duration::from_secs(5), updater).await.is_err() {
        log::warn!("Timeout waiting for category updater to stop");
    }
    log::info!("Shutdown complete");

    result
}
