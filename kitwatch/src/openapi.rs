//! OpenAPI documentation for the `/v1` API, served at `/api-docs/openapi.json` and rendered at
//! `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::{
    self,
    models::{kits, users},
};
use crate::db::models::sensors;

/// Bearer session tokens from `POST /v1/users/login`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.security_schemes.insert(
            "BearerAuth".to_string(),
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Session token returned by `POST /v1/users/login`:\n\n\
                        ```\nAuthorization: Bearer <token>\n```",
                    ))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kitwatch API",
        description = "Telemetry ingestion and retrieval for user-owned sensor kits. Every response uses the `{success, message, data, error}` envelope."
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::users::register,
        api::handlers::users::login,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::kits::create_kit,
        api::handlers::kits::list_kits,
        api::handlers::readings::create_temperature,
        api::handlers::readings::recent_temperature,
        api::handlers::readings::create_light,
        api::handlers::readings::recent_light,
        api::handlers::readings::create_motion,
        api::handlers::readings::recent_motion,
        api::handlers::readings::create_air_quality,
        api::handlers::readings::recent_air_quality,
        api::handlers::readings::create_garden,
        api::handlers::readings::recent_garden,
        api::handlers::readings::create_alert,
        api::handlers::readings::list_alerts,
    ),
    components(
        schemas(
            users::RegisterRequest,
            users::LoginRequest,
            users::LoginResponse,
            users::UserUpdate,
            users::UserResponse,
            kits::KitCreate,
            kits::KitResponse,
            sensors::Temperature,
            sensors::Light,
            sensors::Motion,
            sensors::AirQuality,
            sensors::Garden,
            sensors::Alert,
            sensors::AlertType,
        )
    ),
    tags(
        (name = "users", description = "Registration, login and profiles"),
        (name = "kits", description = "Kit registry"),
        (name = "temperature", description = "Temperature and humidity readings"),
        (name = "light", description = "Light level readings"),
        (name = "motion", description = "Motion detection events"),
        (name = "air-quality", description = "Air quality index readings"),
        (name = "garden", description = "Combined garden readings"),
        (name = "alerts", description = "Threshold alerts raised by kits"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();

        for path in [
            "/v1/users",
            "/v1/users/login",
            "/v1/users/{id}",
            "/v1/kits",
            "/v1/temperature",
            "/v1/light/kit/{kit_id}/minutes/{minutes}",
            "/v1/air-quality",
            "/v1/garden/data",
            "/v1/garden/data/kit/{kit_id}/minutes/{minutes}",
            "/v1/alerts",
            "/v1/alerts/{kit_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("BearerAuth"));
    }
}
