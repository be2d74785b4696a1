use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{KitId, UserId};

/// Database request for creating a new kit
#[derive(Debug, Clone)]
pub struct KitCreateDBRequest {
    pub owner_user_id: UserId,
    pub name: String,
    pub description: String,
}

/// Database response for a kit
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct KitDBResponse {
    pub id: KitId,
    pub owner_user_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
