use actix_web::HttpServer;
use log::{info, warn};
use std::io;
use std::sync::Arc;

use task_api::config::Config;
use task_api::store::{MemoryStore, Store};
use task_api::{app, db, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(|e| {
        eprintln!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.environment.default_log_filter()),
    )
    .init();

    info!("Environment: {}", config.environment);
    info!(
        "Database URL configured: {}",
        if config.database_url.is_some() { "Yes" } else { "No" }
    );

    let store: Arc<dyn Store> = match config.database_url.as_deref() {
        Some(url) => {
            let store = db::connect(url, &config)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store (data is lost on exit)");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(config.clone(), store.clone());

    info!("Server is running on {}", config.server_url());
    let result = match HttpServer::new(move || app(state.clone()))
        .bind((config.server_host.as_str(), config.server_port))
    {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    store.close().await;
    info!("Database connections closed");

    result
}
