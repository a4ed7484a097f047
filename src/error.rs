//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every variant maps to one HTTP status code and is rendered with the same JSON
//! envelope (`{ "success": false, "message": ... }`), so clients never see a
//! different response shape across error kinds.
//!
//! `AppError` implements `actix_web::error::ResponseError`. It also provides `From`
//! conversions for the store, token, validation, bcrypt and blocking-pool errors,
//! allowing handlers to use the `?` operator throughout.
//!
//! The module also owns the single server-error stage ([`error_handlers`]): every
//! response with a 5xx status passes through it and is rewritten into the generic
//! envelope. Error details are only exposed when running in development.

use actix_web::{
    dev::ServiceResponse,
    error::{BlockingError, ResponseError},
    http::{header, StatusCode},
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    web, HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::config::Config;
use crate::response::ApiResponse;
use crate::store::StoreError;

/// Message shown to clients for every 5xx response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

/// Represents all possible errors that can occur within the application.
///
/// Each variant carries a client-facing message. Server-side variants
/// (`DatabaseError`, `InternalError`) carry diagnostic detail instead, which is
/// never sent to clients outside development.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or out-of-range input (HTTP 400).
    ValidationError(String),
    /// Missing, invalid or expired credentials (HTTP 401).
    Unauthorized(String),
    /// Authenticated, but not allowed to touch the resource (HTTP 403).
    Forbidden(String),
    /// The requested resource or route does not exist (HTTP 404).
    NotFound(String),
    /// A uniqueness constraint was violated, e.g. duplicate registration (HTTP 409).
    Conflict(String),
    /// The store failed in a way the handler did not anticipate (HTTP 500).
    DatabaseError(String),
    /// Anything else unanticipated (HTTP 500).
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into enveloped `HttpResponse` objects.
///
/// Server-side variants are rendered with the generic message only; the
/// [`error_handlers`] stage decides whether to attach detail.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::Unauthorized(msg) => builder
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(ApiResponse::<()>::failure(msg.clone())),
            AppError::ValidationError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => builder.json(ApiResponse::<()>::failure(msg.clone())),
            AppError::DatabaseError(_) | AppError::InternalError(_) => builder.json(
                ApiResponse::<()>::failure(INTERNAL_ERROR_MESSAGE).with_error(json!({})),
            ),
        }
    }
}

/// Converts `StoreError` into `AppError`.
///
/// `NotFound` and `Conflict` keep their meaning; everything else becomes a
/// `DatabaseError` whose detail stays server-side.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Database(msg) => AppError::DatabaseError(msg),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Token failures are deliberately collapsed into one client-facing message.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Encoding(msg) => {
                AppError::InternalError(format!("Failed to generate token: {}", msg))
            }
            TokenError::Invalid | TokenError::Expired => {
                AppError::Unauthorized("Invalid or expired token".into())
            }
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalError(error.to_string())
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalError(error.to_string())
    }
}

/// Builds the server-error stage of the middleware chain.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().default_handler_server(render_server_error)
}

/// Rewrites any 5xx response into the uniform envelope.
///
/// The underlying error (when one is attached to the response) is logged, and
/// its text is included in the body only when the app runs in development.
fn render_server_error<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let detail = res.response().error().map(|err| err.to_string());
    let verbose = res
        .request()
        .app_data::<web::Data<Config>>()
        .map(|config| config.environment.is_development())
        .unwrap_or(false);

    log::error!(
        "{} {} failed: {}",
        res.request().method(),
        res.request().path(),
        detail.as_deref().unwrap_or("no error attached")
    );

    let error = match (verbose, detail) {
        (true, Some(detail)) => json!(detail),
        _ => json!({}),
    };

    let (req, res) = res.into_parts();
    let res = HttpResponse::build(res.status())
        .json(ApiResponse::<()>::failure(INTERNAL_ERROR_MESSAGE).with_error(error));

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, res).map_into_right_body(),
    ))
}
