//! API request and response data models.
//!
//! These structures define the public HTTP contract and are kept apart from the database models
//! in [`crate::db::models`], so storage can change without breaking clients. Every response body
//! is wrapped in [`responses::ApiResponse`].
//!
//! - [`users`]: registration, login and profile payloads, plus the authenticated [`users::CurrentUser`]
//! - [`kits`]: kit registry payloads
//! - [`readings`]: sensor create bodies and window path parameters

pub mod kits;
pub mod readings;
pub mod responses;
pub mod users;
