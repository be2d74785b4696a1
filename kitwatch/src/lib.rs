//! # kitwatch: telemetry service for user-owned sensor kits
//!
//! `kitwatch` ingests readings pushed by physical "kits" (small IoT devices) and serves them back
//! to authenticated clients over a JSON HTTP API.
//!
//! ## Overview
//!
//! Users register with an email, a password and a kit code, then log in to receive a signed
//! bearer token. With that token they register kits, push sensor readings for a kit, and query
//! the readings of a kit inside a trailing time window. Six kinds of reading are supported:
//! temperature/humidity, light, motion, air quality, a combined garden reading, and threshold
//! alerts. Every response, successful or not, uses the same `{success, message, data, error}`
//! envelope.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Persistence is PostgreSQL through
//! `sqlx`, or a process-local in-memory store selected with `database.type: memory`.
//!
//! ### Request Flow
//!
//! A request to a protected endpoint first passes [`auth::middleware::require_session`], which
//! verifies the bearer token and attaches the caller as a request extension. The handler then
//! calls one use case from [`service`]; use cases validate their arguments before touching a
//! store, call a store trait from [`db::handlers`], and re-type store failures into
//! [`errors::Error`]. The error converts into the envelope with the matching status code.
//!
//! The guard only authenticates. It does not check that the caller owns the kit named in a
//! sensor request.
//!
//! ### Sensor kinds
//!
//! Each kind is a payload type implementing [`db::models::readings::Reading`], which carries its
//! table mapping and range validation. A single generic repository, use case and pair of
//! handlers serve all of them.
//!
//! ## Configuration
//!
//! See [`config`] for the YAML file and `KITWATCH_` environment overrides.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod service;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Json, Router, http,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;

use crate::{
    api::handlers::{kits, readings, users},
    auth::middleware::require_session,
    config::{CorsOrigin, DatabaseConfig, PoolSettings},
    db::{
        handlers::{KitStore, Kits, UserStore, Users},
        in_memory::InMemoryStore,
    },
    openapi::ApiDoc,
    service::{IdentityService, KitService, ReadingServices},
};

/// Application state shared across all request handlers.
///
/// Every store and use case is built once at startup and shared by clone; there are no global
/// singletons.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .readings(readings)
///     .kits(kits)
///     .identity(identity)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub readings: ReadingServices,
    pub kits: KitService,
    pub identity: IdentityService,
}

impl AppState {
    /// Wire every service to PostgreSQL when a pool is given, otherwise to a fresh in-memory store.
    pub fn from_backend(config: Config, pool: Option<&PgPool>) -> Self {
        let (user_store, kit_store, readings): (Arc<dyn UserStore>, Arc<dyn KitStore>, ReadingServices) = match pool {
            Some(pool) => (
                Arc::new(Users::new(pool.clone())),
                Arc::new(Kits::new(pool.clone())),
                ReadingServices::postgres(pool),
            ),
            None => {
                let store = InMemoryStore::new();
                (Arc::new(store.clone()), Arc::new(store.clone()), ReadingServices::in_memory(&store))
            }
        };

        let kits = KitService::new(kit_store);
        let identity = IdentityService::new(user_store, kits.clone(), config.clone());

        AppState::builder()
            .config(config)
            .readings(readings)
            .kits(kits)
            .identity(identity)
            .build()
    }
}

/// Get the kitwatch database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    let seconds = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(seconds(settings.idle_timeout_secs))
        .max_lifetime(seconds(settings.max_lifetime_secs))
}

/// Connect and migrate, or `None` for the in-memory backend
async fn setup_database(config: &Config) -> anyhow::Result<Option<PgPool>> {
    match &config.database {
        DatabaseConfig::Postgres { url, pool } => {
            info!("Using PostgreSQL database");
            let pool = pool_options(pool).connect(url).await.context("connect to database")?;
            migrator().run(&pool).await.context("run database migrations")?;
            Ok(Some(pool))
        }
        DatabaseConfig::Memory => {
            info!("Using in-memory store: data will be lost on shutdown");
            Ok(None)
        }
    }
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed = &config.auth.security.cors.allowed_origins;
    // tower-http refuses `*` inside an explicit origin list
    let allow_origin = if allowed.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in allowed {
            if let CorsOrigin::Url(url) = origin {
                // Origins never carry the trailing slash Url adds
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
            http::Method::OPTIONS,
            http::Method::PATCH,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_credentials(config.auth.security.cors.allow_credentials);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// - Public `/v1` routes: registration and login
/// - Guarded `/v1` routes: profiles, kits, sensors and alerts
/// - `/healthz`, the OpenAPI document and its Scalar UI
/// - Optional Prometheus metrics at `/internal/metrics`
/// - CORS and request tracing
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let public_routes = Router::new()
        .route("/users", post(users::register))
        .route("/users/", post(users::register))
        .route("/users/login", post(users::login));

    let protected_routes = Router::new()
        .route("/users/{id}", get(users::get_user).put(users::update_user))
        .route("/kits", post(kits::create_kit).get(kits::list_kits))
        .route("/kits/", post(kits::create_kit))
        .route("/temperature", post(readings::create_temperature))
        .route("/temperature/", post(readings::create_temperature))
        .route("/temperature/kit/{kit_id}/minutes/{minutes}", get(readings::recent_temperature))
        .route("/light", post(readings::create_light))
        .route("/light/", post(readings::create_light))
        .route("/light/kit/{kit_id}/minutes/{minutes}", get(readings::recent_light))
        .route("/motion", post(readings::create_motion))
        .route("/motion/", post(readings::create_motion))
        .route("/motion/kit/{kit_id}/minutes/{minutes}", get(readings::recent_motion))
        .route("/air-quality", post(readings::create_air_quality))
        .route("/air-quality/", post(readings::create_air_quality))
        .route("/air-quality/kit/{kit_id}/minutes/{minutes}", get(readings::recent_air_quality))
        .route("/garden/data", post(readings::create_garden))
        .route("/garden/data/", post(readings::create_garden))
        .route("/garden/data/kit/{kit_id}/minutes/{minutes}", get(readings::recent_garden))
        .route("/alerts", post(readings::create_alert))
        .route("/alerts/", post(readings::create_alert))
        .route("/alerts/{kit_id}", get(readings::list_alerts))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let cors_layer = create_cors_layer(&state.config)?;
    let enable_metrics = state.config.enable_metrics;

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/v1", public_routes.merge(protected_routes))
        .with_state(state)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer);

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route(
                "/internal/metrics",
                get(move || {
                    let handle = metric_handle.clone();
                    async move { handle.render() }
                }),
            )
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!(
            "Starting kitwatch on {} (metrics: {}, otel export: {})",
            config.bind_address(),
            config.enable_metrics,
            config.enable_otel_export
        );

        let pool = setup_database(&config).await?;
        let app_state = AppState::from_backend(config.clone(), pool.as_ref());
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "kitwatch listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
