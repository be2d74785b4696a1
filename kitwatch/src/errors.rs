use crate::api::models::responses::ApiResponse;
use crate::db::errors::DbError;
use crate::types::KitId;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Malformed or out-of-range input, detected before any store access
    #[error("{message}")]
    InvalidArgument { message: String },

    /// A reading referenced a kit that does not exist
    #[error("Kit {kit_id} does not exist")]
    ReferentialIntegrity { kit_id: KitId },

    /// Bearer token missing, malformed, expired or signed with another key
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Password did not match the stored hash
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but acting on somebody else's resource
    #[error("{message}")]
    Forbidden { message: String },

    /// Requested resource not found
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    /// Registration attempted with a kit code that is already claimed
    #[error("Kit code is already registered")]
    KitCodeExists,

    /// Registration attempted with an email that is already in use
    #[error("Email is already registered")]
    EmailExists,

    /// The store could not be reached
    #[error("Store unavailable while trying to {operation}")]
    StoreUnavailable { operation: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Re-type a store failure that the caller has no more specific mapping for.
    pub fn from_store(err: DbError, operation: impl Into<String>) -> Self {
        match err {
            DbError::Unavailable(source) => {
                tracing::debug!("Store unavailable: {source}");
                Error::StoreUnavailable {
                    operation: operation.into(),
                }
            }
            other => Error::Database(other),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidArgument { .. } | Error::ReferentialIntegrity { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthenticated { .. } | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::KitCodeExists | Error::EmailExists => StatusCode::CONFLICT,
            Error::StoreUnavailable { .. } | Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Unavailable(_) | DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidArgument { message } => message.clone(),
            Error::ReferentialIntegrity { kit_id } => format!("Kit {kit_id} does not exist"),
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::InvalidCredentials => "Invalid credentials".to_string(),
            Error::Forbidden { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} {id} not found"),
            Error::KitCodeExists => "This kit code is already registered".to_string(),
            Error::EmailExists => "An account with this email address already exists".to_string(),
            Error::StoreUnavailable { .. } | Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { .. } => "Resource already exists".to_string(),
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Unavailable(_) | DbError::Other(_) => "Internal server error".to_string(),
            },
        }
    }

    /// Short summary used as the envelope `message`
    fn summary(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Invalid request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not found",
            StatusCode::CONFLICT => "Conflict",
            _ => "Internal error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_) | DbError::Unavailable(_))
            | Error::StoreUnavailable { .. }
            | Error::Internal { .. }
            | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InvalidCredentials | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::KitCodeExists | Error::EmailExists => {
                tracing::warn!("Conflict error: {}", self);
            }
            Error::InvalidArgument { .. } | Error::ReferentialIntegrity { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ApiResponse::<()>::failure(self.summary(), self.user_message());
        (self.status_code(), Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        let cases = [
            (Error::InvalidArgument { message: "bad".into() }, StatusCode::BAD_REQUEST),
            (Error::ReferentialIntegrity { kit_id: 7 }, StatusCode::BAD_REQUEST),
            (Error::Unauthenticated { message: None }, StatusCode::UNAUTHORIZED),
            (Error::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                Error::NotFound {
                    resource: "User".into(),
                    id: "1".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (Error::KitCodeExists, StatusCode::CONFLICT),
            (Error::EmailExists, StatusCode::CONFLICT),
            (Error::StoreUnavailable { operation: "read".into() }, StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Internal { operation: "hash".into() }, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error:?}");
        }
    }

    #[test]
    fn test_internal_errors_do_not_leak_details() {
        let error = Error::Internal {
            operation: "connect to postgres://user:secret@db".into(),
        };
        assert_eq!(error.user_message(), "Internal server error");

        let error = Error::Other(anyhow::anyhow!("column \"password_hash\" missing"));
        assert_eq!(error.user_message(), "Internal server error");
    }

    #[test]
    fn test_from_store_keeps_unavailable_distinct() {
        let error = Error::from_store(DbError::Unavailable(sqlx::Error::PoolTimedOut), "list readings");
        assert!(matches!(error, Error::StoreUnavailable { .. }));

        let error = Error::from_store(DbError::Other(anyhow::anyhow!("boom")), "list readings");
        assert!(matches!(error, Error::Database(DbError::Other(_))));
    }

    #[tokio::test]
    async fn test_error_renders_envelope() {
        let response = Error::KitCodeExists.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Conflict");
        assert!(body["data"].is_null());
        assert_eq!(body["error"], "This kit code is already registered");
    }
}
