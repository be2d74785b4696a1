use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, instrument, trace};

/// Extract the bearer token from the Authorization header
/// Returns:
/// - None: no Authorization header
/// - Some(Ok(token)): a `Bearer` token is present
/// - Some(Err(error)): the header is present but is not a usable bearer credential
fn bearer_token(parts: &Parts) -> Option<Result<&str>> {
    let auth_header = parts.headers.get(AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(_) => {
            return Some(Err(Error::Unauthenticated {
                message: Some("Invalid authorization header".to_string()),
            }));
        }
    };

    match auth_str.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Some(Ok(token)),
        _ => Some(Err(Error::Unauthenticated {
            message: Some("Authorization header must use the Bearer scheme".to_string()),
        })),
    }
}

/// Authenticate a request from its bearer token alone.
#[instrument(skip_all)]
pub fn authenticate(parts: &Parts, config: &Config) -> Result<CurrentUser> {
    match bearer_token(parts) {
        Some(Ok(token)) => {
            let user = session::verify_session_token(token, config)?;
            debug!("Authenticated user {} from bearer token", user.id);
            Ok(user)
        }
        Some(Err(e)) => Err(e),
        None => {
            trace!("No Authorization header present");
            Err(Error::Unauthenticated { message: None })
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Already verified by the session guard for this request
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        authenticate(parts, &state.config)
    }
}
