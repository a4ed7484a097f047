use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::store::Store;

/// Liveness endpoint
///
/// Confirms the process is serving requests and reports the build version.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task Management API is running!",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Health check endpoint
///
/// Always answers 200; `database` reports whether the store is reachable.
#[get("/health")]
pub async fn health(store: web::Data<dyn Store>) -> impl Responder {
    let database = match store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            log::warn!("Health check could not reach the database: {}", e);
            "unavailable"
        }
    };

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "API is healthy",
        "timestamp": Utc::now(),
        "database": database
    }))
}
