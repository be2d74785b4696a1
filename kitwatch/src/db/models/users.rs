use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

use crate::types::UserId;

/// Database request for creating a new user
#[derive(Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Database request for updating a user's profile
#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub first_name: String,
    pub last_name: String,
}

/// Database response for a user
#[derive(Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

// Password hashes stay out of logs and spans
impl fmt::Debug for UserCreateDBRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCreateDBRequest")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UserDBResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDBResponse")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
