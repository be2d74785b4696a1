//! Sensor ingestion and window query endpoints.
//!
//! Every sensor kind exposes the same pair of endpoints; [`sensor_endpoints!`] stamps them out
//! per kind so each gets its own OpenAPI operation. Alerts are read by kit rather than by window.

use crate::{
    AppState,
    api::{
        extractors::{ApiJson, ApiPath},
        models::{
            readings::{CreateReading, KitPath, WindowPath},
            responses::ApiResponse,
            users::CurrentUser,
        },
    },
    db::models::{
        readings::{Reading, SensorRecord},
        sensors::{AirQuality, Alert, Garden, Light, Motion, Temperature},
    },
    errors::Result,
    service::ReadingService,
};
use axum::{Json, extract::State, http::StatusCode};

async fn create_reading<R: Reading>(
    service: &ReadingService<R>,
    body: CreateReading<R>,
) -> Result<(StatusCode, Json<ApiResponse<SensorRecord<R>>>)> {
    let record = service.record(body.kit_id, body.payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(format!("{} data recorded successfully", R::KIND), record)),
    ))
}

async fn recent_readings<R: Reading>(service: &ReadingService<R>, path: WindowPath) -> Result<Json<ApiResponse<Vec<SensorRecord<R>>>>> {
    let records = service.recent(path.kit_id, path.minutes).await?;
    Ok(Json(ApiResponse::ok(format!("{} data retrieved successfully", R::KIND), records)))
}

/// `sensor_endpoints!(field, Kind, "/v1/collection", "/v1/collection/kit/{kit_id}/minutes/{minutes}", "tag")`
///
/// Generates `create_<field>` and `recent_<field>` handlers backed by `state.readings.<field>`.
macro_rules! sensor_endpoints {
    ($field:ident, $kind:ident, $create_path:tt, $window_path:tt, $tag:tt) => {
        paste::paste! {
            #[utoipa::path(
                post,
                path = $create_path,
                tag = $tag,
                summary = "Record a reading",
                request_body = CreateReading<$kind>,
                responses(
                    (status = 201, description = "Reading recorded", body = ApiResponse<SensorRecord<$kind>>),
                    (status = 400, description = "Invalid payload or unknown kit"),
                    (status = 401, description = "Unauthorized"),
                    (status = 500, description = "Internal server error")
                ),
                security(("BearerAuth" = []))
            )]
            #[tracing::instrument(skip_all)]
            pub async fn [<create_ $field>](
                State(state): State<AppState>,
                _: CurrentUser,
                ApiJson(body): ApiJson<CreateReading<$kind>>,
            ) -> Result<(StatusCode, Json<ApiResponse<SensorRecord<$kind>>>)> {
                create_reading(&state.readings.$field, body).await
            }

            #[utoipa::path(
                get,
                path = $window_path,
                tag = $tag,
                summary = "Readings in a trailing window",
                params(WindowPath),
                responses(
                    (status = 200, description = "Readings, newest first", body = ApiResponse<Vec<SensorRecord<$kind>>>),
                    (status = 400, description = "Malformed or non-positive path parameters"),
                    (status = 401, description = "Unauthorized"),
                    (status = 500, description = "Internal server error")
                ),
                security(("BearerAuth" = []))
            )]
            #[tracing::instrument(skip_all)]
            pub async fn [<recent_ $field>](
                State(state): State<AppState>,
                _: CurrentUser,
                ApiPath(path): ApiPath<WindowPath>,
            ) -> Result<Json<ApiResponse<Vec<SensorRecord<$kind>>>>> {
                recent_readings(&state.readings.$field, path).await
            }
        }
    };
}

sensor_endpoints!(
    temperature,
    Temperature,
    "/v1/temperature",
    "/v1/temperature/kit/{kit_id}/minutes/{minutes}",
    "temperature"
);
sensor_endpoints!(light, Light, "/v1/light", "/v1/light/kit/{kit_id}/minutes/{minutes}", "light");
sensor_endpoints!(motion, Motion, "/v1/motion", "/v1/motion/kit/{kit_id}/minutes/{minutes}", "motion");
sensor_endpoints!(
    air_quality,
    AirQuality,
    "/v1/air-quality",
    "/v1/air-quality/kit/{kit_id}/minutes/{minutes}",
    "air-quality"
);
sensor_endpoints!(
    garden,
    Garden,
    "/v1/garden/data",
    "/v1/garden/data/kit/{kit_id}/minutes/{minutes}",
    "garden"
);

#[utoipa::path(
    post,
    path = "/v1/alerts",
    tag = "alerts",
    summary = "Raise an alert",
    request_body = CreateReading<Alert>,
    responses(
        (status = 201, description = "Alert recorded", body = ApiResponse<SensorRecord<Alert>>),
        (status = 400, description = "Invalid payload or unknown kit"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_alert(
    State(state): State<AppState>,
    _: CurrentUser,
    ApiJson(body): ApiJson<CreateReading<Alert>>,
) -> Result<(StatusCode, Json<ApiResponse<SensorRecord<Alert>>>)> {
    create_reading(&state.readings.alerts, body).await
}

#[utoipa::path(
    get,
    path = "/v1/alerts/{kit_id}",
    tag = "alerts",
    summary = "All alerts of a kit",
    params(KitPath),
    responses(
        (status = 200, description = "Alerts, newest first", body = ApiResponse<Vec<SensorRecord<Alert>>>),
        (status = 400, description = "Malformed or non-positive kit id"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_alerts(
    State(state): State<AppState>,
    _: CurrentUser,
    ApiPath(path): ApiPath<KitPath>,
) -> Result<Json<ApiResponse<Vec<SensorRecord<Alert>>>>> {
    let alerts = state.readings.alerts.history(path.kit_id).await?;
    Ok(Json(ApiResponse::ok("Alerts retrieved successfully", alerts)))
}
