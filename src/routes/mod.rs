pub mod auth;
pub mod health;
pub mod protected;
pub mod tasks;

use actix_cors::Cors;
use actix_web::{error, web, Either, HttpRequest, HttpResponse};

use crate::error::AppError;
use crate::response::ApiResponse;

/// Largest JSON or form body accepted by any route.
const BODY_LIMIT: usize = 64 * 1024;

/// A request body sent either as JSON or as `application/x-www-form-urlencoded`.
pub type JsonOrForm<T> = Either<web::Json<T>, web::Form<T>>;

pub(crate) fn into_body<T>(body: JsonOrForm<T>) -> T {
    match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

/// Mounts every route group.
///
/// Routes are registered with method guards (the `#[get]`/`#[post]` macros),
/// so a known path requested with an unsupported method falls through to the
/// default 404 handler instead of answering 405. The auth gate is attached to
/// each protected resource rather than to a scope, so unmatched paths under a
/// protected prefix are 404 too.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::index)
        .service(health::health)
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .service(auth::register)
                        .service(auth::login),
                )
                .service(
                    web::scope("/tasks")
                        .service(tasks::get_tasks)
                        .service(tasks::create_task)
                        .service(tasks::get_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task),
                )
                .service(protected::protected),
        );
}

pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

/// Renders malformed or missing JSON bodies as 400 envelopes.
///
/// For [`JsonOrForm`] bodies this is the error reported when neither
/// encoding parses.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(BODY_LIMIT)
        .error_handler(|err, _req| {
            let message = match &err {
                error::JsonPayloadError::ContentType => {
                    "Request body must be JSON or form-encoded".to_string()
                }
                other => format!("Invalid request body: {}", other),
            };
            AppError::ValidationError(message).into()
        })
}

pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .limit(BODY_LIMIT)
        .error_handler(|err, _req| {
            AppError::ValidationError(format!("Invalid form body: {}", err)).into()
        })
}

/// Renders unparsable path segments (e.g. a task id that is not a UUID) as 400.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(format!("Invalid path: {}", err)).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid query string: {}", err)).into()
    })
}

/// Default service: every unmatched path or method.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    log::debug!("No route for {} {}", req.method(), req.path());
    HttpResponse::NotFound().json(ApiResponse::<()>::failure("Route not found"))
}
