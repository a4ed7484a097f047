use actix_web::{get, HttpResponse, Responder};

use crate::auth::{AuthMiddleware, AuthenticatedUser};
use crate::response::ApiResponse;

/// Echoes the identity resolved from the bearer token.
#[get("/protected", wrap = "AuthMiddleware")]
pub async fn protected(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(user.0).with_message("This is a protected route"))
}
