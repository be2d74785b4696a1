//! API request/response models for kits.

use crate::db::models::kits::KitDBResponse;
use crate::types::{KitId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct KitCreate {
    /// Kit code, 3 to 100 characters
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KitResponse {
    pub id: KitId,
    pub owner_user_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<KitDBResponse> for KitResponse {
    fn from(db: KitDBResponse) -> Self {
        Self {
            id: db.id,
            owner_user_id: db.owner_user_id,
            name: db.name,
            description: db.description,
            created_at: db.created_at,
        }
    }
}
