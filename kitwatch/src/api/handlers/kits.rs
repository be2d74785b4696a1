use crate::{
    AppState,
    api::{
        extractors::ApiJson,
        models::{
            kits::{KitCreate, KitResponse},
            responses::ApiResponse,
            users::CurrentUser,
        },
    },
    errors::Result,
};
use axum::{Json, extract::State, http::StatusCode};

#[utoipa::path(
    post,
    path = "/v1/kits",
    tag = "kits",
    summary = "Register a kit",
    description = "Creates a kit owned by the caller. Kit names are trimmed and need not be unique.",
    request_body = KitCreate,
    responses(
        (status = 201, description = "Kit created", body = ApiResponse<KitResponse>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_kit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(create): ApiJson<KitCreate>,
) -> Result<(StatusCode, Json<ApiResponse<KitResponse>>)> {
    let kit = state.kits.create(current_user.id, &create.name, &create.description).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Kit created successfully", KitResponse::from(kit)))))
}

#[utoipa::path(
    get,
    path = "/v1/kits",
    tag = "kits",
    summary = "List own kits",
    responses(
        (status = 200, description = "The caller's kits, newest first", body = ApiResponse<Vec<KitResponse>>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_kits(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<ApiResponse<Vec<KitResponse>>>> {
    let kits = state.kits.list_for_owner(current_user.id).await?;
    let kits: Vec<KitResponse> = kits.into_iter().map(KitResponse::from).collect();
    Ok(Json(ApiResponse::ok("Kits retrieved successfully", kits)))
}

#[cfg(test)]
mod tests {
    use crate::api::models::{kits::KitResponse, responses::ApiResponse};
    use crate::test_utils::{auth_header, create_test_app, create_test_kit, register_and_login};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_kits_are_scoped_to_caller() {
        let server = create_test_app().await;
        let (alice, alice_token) = register_and_login(&server, "alice@example.com").await;
        let (_, bob_token) = register_and_login(&server, "bob@example.com").await;

        let first = create_test_kit(&server, &alice_token, "balcony-kit").await;
        let second = create_test_kit(&server, &alice_token, "garden-kit").await;
        assert_eq!(first.owner_user_id, alice.id);

        let (name, value) = auth_header(&alice_token);
        let body: ApiResponse<Vec<KitResponse>> = server.get("/v1/kits").add_header(name, value).await.json();
        let ids: Vec<i64> = body.data.unwrap().iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let (name, value) = auth_header(&bob_token);
        let response = server.get("/v1/kits").add_header(name, value).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_kit_validation_and_auth() {
        let server = create_test_app().await;
        let (_, token) = register_and_login(&server, "a@b.com").await;

        server
            .post("/v1/kits")
            .json(&json!({"name": "valid-kit", "description": "no token"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = auth_header(&token);
        let response = server
            .post("/v1/kits")
            .add_header(name, value)
            .json(&json!({"name": "ab", "description": "too short"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ApiResponse<()> = response.json();
        assert_eq!(body.message, "Invalid request");
        assert!(body.error.unwrap().contains("name"));
    }
}
