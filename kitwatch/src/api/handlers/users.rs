use crate::{
    AppState,
    api::{
        extractors::{ApiJson, ApiPath},
        models::{
            responses::ApiResponse,
            users::{CurrentUser, LoginRequest, LoginResponse, RegisterRequest, UserResponse, UserUpdate},
        },
    },
    errors::{Error, Result},
    service::identity::Registration,
    types::UserId,
};
use axum::{Json, extract::State, http::StatusCode};

#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "users",
    summary = "Register a user",
    description = "Creates an account. The kit code must not already be registered as a kit; no kit is created.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Kit code or email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let user = state
        .identity
        .register(Registration {
            first_name: &request.first_name,
            last_name: &request.last_name,
            email: &request.email,
            password: &request.password,
            kit_code: &request.kit_code,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User registered successfully", UserResponse::from(user))),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/users/login",
    tag = "users",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "No user with this email"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> Result<Json<ApiResponse<LoginResponse>>> {
    let outcome = state.identity.login(&request.email, &request.password).await?;

    let response = LoginResponse {
        token: outcome.token,
        token_type: "Bearer".to_string(),
        expires_in: state.identity.token_lifetime_secs(),
        user: UserResponse::from(outcome.user),
    };
    Ok(Json(ApiResponse::ok("Login successful", response)))
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "users",
    summary = "Get a user",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    _: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let user = state.identity.get_user(id).await?;
    Ok(Json(ApiResponse::ok("User retrieved successfully", UserResponse::from(user))))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    tag = "users",
    summary = "Update own profile",
    request_body = UserUpdate,
    params(("id" = i64, Path, description = "User ID; must be the caller's own")),
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Updating another user's profile"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    if current_user.id != id {
        return Err(Error::Forbidden {
            message: "You can only update your own profile".to_string(),
        });
    }

    let user = state.identity.update_profile(id, &update.first_name, &update.last_name).await?;
    Ok(Json(ApiResponse::ok("User updated successfully", UserResponse::from(user))))
}

#[cfg(test)]
mod tests {
    use crate::api::models::{
        responses::ApiResponse,
        users::{LoginResponse, UserResponse},
    };
    use crate::test_utils::{auth_header, create_test_app, register_and_login};
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_register_and_login_flow() {
        let server = create_test_app().await;

        let response = server
            .post("/v1/users")
            .json(&json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "password": "analytical",
                "kit_code": "ABC123"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert!(body["error"].is_null());
        assert!(body["data"].get("password_hash").is_none());
        assert!(!response.text().contains("analytical"));

        let response = server
            .post("/v1/users/login")
            .json(&json!({"email": "ada@example.com", "password": "analytical"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<LoginResponse> = response.json();
        let login = body.data.unwrap();
        assert_eq!(login.token_type, "Bearer");
        assert_eq!(login.user.email, "ada@example.com");
        assert!(login.expires_in > 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let server = create_test_app().await;
        register_and_login(&server, "dup@example.com").await;

        let response = server
            .post("/v1/users")
            .json(&json!({
                "first_name": "Second",
                "last_name": "User",
                "email": "dup@example.com",
                "password": "password2",
                "kit_code": "UNUSED-CODE"
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ApiResponse<()> = response.json();
        assert!(!body.success);
        assert_eq!(body.message, "Conflict");
    }

    #[tokio::test]
    async fn test_login_distinguishes_unknown_user_and_wrong_password() {
        let server = create_test_app().await;
        register_and_login(&server, "a@b.com").await;

        server
            .post("/v1/users/login")
            .json(&json!({"email": "a@b.com", "password": "wrong-password"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .post("/v1/users/login")
            .json(&json!({"email": "missing@b.com", "password": "whatever"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_requires_token_and_ownership() {
        let server = create_test_app().await;
        let (alice, alice_token) = register_and_login(&server, "alice@example.com").await;
        let (bob, _) = register_and_login(&server, "bob@example.com").await;

        server.get(&format!("/v1/users/{}", alice.id)).await.assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = auth_header(&alice_token);
        let response = server.get(&format!("/v1/users/{}", bob.id)).add_header(name, value).await;
        response.assert_status_ok();

        let (name, value) = auth_header(&alice_token);
        let response = server
            .put(&format!("/v1/users/{}", bob.id))
            .add_header(name, value)
            .json(&json!({"first_name": "Mallory", "last_name": "X"}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let (name, value) = auth_header(&alice_token);
        let response = server
            .put(&format!("/v1/users/{}", alice.id))
            .add_header(name, value)
            .json(&json!({"first_name": "Alicia", "last_name": "Smith"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<UserResponse> = response.json();
        assert_eq!(body.data.unwrap().first_name, "Alicia");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let server = create_test_app().await;
        let (_, token) = register_and_login(&server, "a@b.com").await;

        let (name, value) = auth_header(&token);
        server.get("/v1/users/424242").add_header(name, value).await.assert_status(StatusCode::NOT_FOUND);
    }
}
