#![allow(dead_code)]

use actix_web::{body::MessageBody, dev::ServiceResponse, http::header, test};
use serde_json::{json, Value};
use std::sync::Arc;
use task_api::config::Config;
use task_api::store::{MemoryStore, Store};
use task_api::AppState;

pub const TEST_SECRET: &str = "integration_test_secret";

pub fn test_config(environment: &str) -> Config {
    let environment = environment.to_string();
    Config::from_lookup(move |key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.into()),
        "BCRYPT_COST" => Some("4".into()),
        "APP_ENV" => Some(environment.clone()),
        "DATABASE_URL" => Some("postgres://unused".into()),
        _ => None,
    })
    .expect("test config should parse")
}

pub fn state_with(store: Arc<dyn Store>, environment: &str) -> AppState {
    AppState::new(test_config(environment), store)
}

pub fn memory_state() -> AppState {
    state_with(Arc::new(MemoryStore::new()), "development")
}

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    password: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(status, 201, "registration failed: {}", body);

    TestUser {
        id: body["data"]["user"]["id"].as_i64().expect("user id"),
        token: body["data"]["token"]
            .as_str()
            .expect("token")
            .to_string(),
    }
}

pub async fn create_task(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    payload: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(bearer(token))
        .set_json(payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(status, 201, "task creation failed: {}", body);
    body["data"].clone()
}
