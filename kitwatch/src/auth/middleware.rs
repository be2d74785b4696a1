use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::instrument;

use crate::{AppState, auth::current_user::authenticate, errors::Error};

/// Session guard for protected routes.
///
/// Verifies the bearer token before the handler runs and stores the caller as a
/// [`crate::api::models::users::CurrentUser`] request extension. Requests without a valid token
/// are rejected with 401 and never reach the handler.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, Error> {
    let (mut parts, body) = request.into_parts();
    let user = authenticate(&parts, &state.config)?;
    parts.extensions.insert(user);

    Ok(next.run(Request::from_parts(parts, body)).await)
}
