use crate::{
    Application,
    api::models::{
        kits::KitResponse,
        responses::ApiResponse,
        users::{LoginResponse, UserResponse},
    },
    config::{Config, DatabaseConfig},
};
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

pub fn create_test_config() -> Config {
    let mut config = Config {
        database: DatabaseConfig::Memory,
        secret_key: Some("kitwatch-test-secret".to_string()),
        ..Default::default()
    };
    // Cheap hashing keeps registration fast in tests
    config.auth.password.argon2_memory_kib = 1024;
    config.auth.password.argon2_iterations = 1;
    config
}

/// Full router over a fresh in-memory store
pub async fn create_test_app() -> TestServer {
    Application::new(create_test_config())
        .await
        .expect("Failed to create application")
        .into_test_server()
}

pub fn auth_header(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Register `email` (with a kit code derived from it) and log in. Returns the user and a token.
pub async fn register_and_login(server: &TestServer, email: &str) -> (UserResponse, String) {
    let password = "test-password";

    let response = server
        .post("/v1/users")
        .json(&json!({
            "first_name": "Test",
            "last_name": "User",
            "email": email,
            "password": password,
            "kit_code": format!("code-{email}")
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/v1/users/login")
        .json(&json!({"email": email, "password": password}))
        .await;
    response.assert_status_ok();
    let login = response.json::<ApiResponse<LoginResponse>>().data.expect("login data");

    (login.user, login.token)
}

pub async fn create_test_kit(server: &TestServer, token: &str, name: &str) -> KitResponse {
    let (header, value) = auth_header(token);
    let response = server
        .post("/v1/kits")
        .add_header(header, value)
        .json(&json!({"name": name, "description": "test kit"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<ApiResponse<KitResponse>>().data.expect("kit data")
}
