//! Process-wide database pool.
//!
//! [`connect`] is called exactly once from `main`. The returned
//! [`PgStore`] is shared by every worker and closed through `Store::close`
//! when the server shuts down.

use log::{error, info, warn};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::store::PgStore;

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
    info!("Database migrations are up to date");
    Ok(())
}

/// Builds the pool and applies pending migrations.
///
/// If the database cannot be reached at startup the server still comes up:
/// the pool is created lazily, requests fail with 500 until the database
/// becomes available, and migrations run on the first query that reaches it.
/// A malformed URL or a failing migration on a reachable database is fatal.
pub async fn connect(database_url: &str, config: &Config) -> Result<PgStore, sqlx::Error> {
    let statement_level = if config.environment.is_development() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Off
    };

    let options = PgConnectOptions::from_str(database_url)?
        .log_statements(statement_level)
        .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(1));

    let pool_options = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5));

    match pool_options.clone().connect_with(options.clone()).await {
        Ok(pool) => {
            info!("Database connected successfully");
            run_migrations(&pool).await?;
            Ok(PgStore::new(pool))
        }
        Err(e) => {
            error!("Database connection failed: {}", e);
            warn!("App will continue without database connection");
            warn!("Migrations were skipped and will run once the database is reachable");
            Ok(PgStore::with_pending_migrations(
                pool_options.connect_lazy_with(options),
            ))
        }
    }
}
