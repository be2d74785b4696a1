//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//! - **[`extractors`]**: Body and path extractors that reject with the error envelope
//!
//! # API Structure
//!
//! - **Users** (`/v1/users/*`): registration, login, profiles
//! - **Kits** (`/v1/kits`): kit registry for the caller
//! - **Sensors** (`/v1/temperature`, `/v1/light`, `/v1/motion`, `/v1/air-quality`,
//!   `/v1/garden/data`): ingestion plus `/kit/{kit_id}/minutes/{minutes}` window queries
//! - **Alerts** (`/v1/alerts`): ingestion plus `/v1/alerts/{kit_id}`

pub mod extractors;
pub mod handlers;
pub mod models;
