//! Authentication system.
//!
//! Kitwatch authenticates with stateless bearer tokens:
//! - Users log in via `POST /v1/users/login` with email/password
//! - The response carries a signed HS256 JWT holding the user id and email
//! - Clients send it back as `Authorization: Bearer <token>` on every protected request
//! - Tokens expire after `auth.security.jwt_expiry`; there is no server-side session state
//!
//! The guard only authenticates. It does not check that the caller owns the kit a sensor
//! request refers to.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for getting the authenticated user in handlers
//! - [`middleware`]: Route protection middleware
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: Token creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use kitwatch::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.email)
//! }
//! ```

pub mod current_user;
pub mod middleware;
pub mod password;
pub mod session;
