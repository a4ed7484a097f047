#![doc = "The `task_api` library crate."]
#![doc = ""]
#![doc = "This crate contains the authentication gate, domain models, persistence port,"]
#![doc = "routing configuration and error handling for the task management API."]
#![doc = "The binary (`main.rs`) builds an [`AppState`] once and serves [`app`]."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod store;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App,
};
use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::store::Store;

pub use crate::error::AppError;
pub use crate::response::ApiResponse;

/// Process-scoped resources shared by every worker.
///
/// Built once at startup; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub config: web::Data<Config>,
    pub tokens: web::Data<TokenService>,
    pub store: web::Data<dyn Store>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let tokens = TokenService::from_config(&config);
        Self {
            config: web::Data::new(config),
            tokens: web::Data::new(tokens),
            store: web::Data::from(store),
        }
    }
}

/// Builds the application.
///
/// Middleware runs in a fixed order, outermost first: CORS, access log, the
/// 5xx error stage, then routing. Anything no route matches is answered by
/// [`routes::not_found`].
pub fn app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state.config)
        .app_data(state.tokens)
        .app_data(state.store)
        .app_data(routes::json_config())
        .app_data(routes::form_config())
        .app_data(routes::path_config())
        .app_data(routes::query_config())
        .wrap(error::error_handlers())
        .wrap(Logger::default())
        .wrap(routes::cors())
        .configure(routes::config)
        .default_service(web::to(routes::not_found))
}
