use crate::{
    auth::{
        hash_password, normalize_email, verify_password, AuthResponse, LoginRequest,
        RegisterRequest, TokenService,
    },
    config::Config,
    error::AppError,
    models::NewUser,
    response::ApiResponse,
    store::Store,
};
use super::{into_body, JsonOrForm};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
///
/// ## Responses:
/// - `201 Created`: `{ token, user }`.
/// - `400 Bad Request`: missing or invalid fields.
/// - `409 Conflict`: the email or username is already registered.
#[post("/register")]
pub async fn register(
    store: web::Data<dyn Store>,
    tokens: web::Data<TokenService>,
    config: web::Data<Config>,
    register_data: JsonOrForm<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let register_data = into_body(register_data);
    register_data.validate()?;
    let RegisterRequest {
        username,
        email,
        password,
    } = register_data;

    let cost = config.bcrypt_cost;
    let password_hash = web::block(move || hash_password(&password, cost)).await??;

    let user = store
        .create_user(NewUser {
            username,
            email: normalize_email(&email),
            password_hash,
        })
        .await?;

    let token = tokens.issue(user.id)?;
    log::info!("Registered user {}", user.id);

    Ok(HttpResponse::Created().json(
        ApiResponse::success(AuthResponse { token, user })
            .with_message("User registered successfully"),
    ))
}

/// Login user
///
/// Authenticates a user and returns an authentication token. Unknown emails
/// and wrong passwords produce the same 401 response.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    tokens: web::Data<TokenService>,
    login_data: JsonOrForm<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let login_data = into_body(login_data);
    login_data.validate()?;
    let LoginRequest { email, password } = login_data;

    let invalid_credentials = || AppError::Unauthorized("Invalid credentials".into());

    let stored = store
        .find_user_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_hash = stored.password_hash.clone();
    let matches = web::block(move || verify_password(&password, &password_hash)).await??;
    if !matches {
        log::debug!("Failed login attempt for user {}", stored.id);
        return Err(invalid_credentials());
    }

    let user = stored.into_user();
    let token = tokens.issue(user.id)?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::success(AuthResponse { token, user }).with_message("Login successful"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use actix_web::{http::StatusCode, test, App};
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("route_test_secret".into()),
            "BCRYPT_COST" => Some("4".into()),
            _ => None,
        })
        .unwrap()
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .app_data(web::Data::new(TokenService::new("secret", Duration::hours(1))))
                .app_data(web::Data::new(test_config()))
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "username": "test",
                "email": "invalid-email",
                "password": "password123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "username": "test",
                "email": "test@example.com",
                "password": "short"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_login_unknown_user() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .app_data(web::Data::new(TokenService::new("secret", Duration::hours(1))))
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({
                "email": "nobody@example.com",
                "password": "password123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid credentials");
    }
}
