//! HTTP request handlers for all `/v1` endpoints.
//!
//! Handlers deserialize the request, call one service method and wrap the result in the
//! [`crate::api::models::responses::ApiResponse`] envelope. Errors convert to the same envelope
//! through [`crate::errors::Error`]'s `IntoResponse` implementation.
//!
//! - [`users`]: registration, login and profile management
//! - [`kits`]: kit registry
//! - [`readings`]: sensor ingestion, window queries and alerts
//!
//! Everything except registration and login sits behind
//! [`crate::auth::middleware::require_session`].

pub mod kits;
pub mod readings;
pub mod users;
