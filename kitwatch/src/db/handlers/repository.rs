//! Store traits shared by the PostgreSQL repositories and the in-memory store.
//!
//! Services hold these as `Arc<dyn ...>` so the same use-case code runs against either backend.
//! Every method is a single atomic statement; none of them retries.

use crate::db::errors::Result;
use crate::db::models::{
    kits::{KitCreateDBRequest, KitDBResponse},
    readings::{Reading, RecordWindow, SensorRecord},
    users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::{KitId, UserId};

/// Append-only store of one sensor kind.
#[async_trait::async_trait]
pub trait ReadingStore<R: Reading>: Send + Sync {
    /// Insert one record. A missing kit surfaces as [`crate::db::errors::DbError::ForeignKeyViolation`].
    async fn create(&self, kit_id: KitId, payload: &R) -> Result<SensorRecord<R>>;

    /// Records of a kit inside `window`, most recent first.
    async fn list(&self, kit_id: KitId, window: RecordWindow) -> Result<Vec<SensorRecord<R>>>;
}

/// Kit registry storage.
#[async_trait::async_trait]
pub trait KitStore: Send + Sync {
    /// Insert a kit. Names are not required to be unique.
    async fn create(&self, request: &KitCreateDBRequest) -> Result<KitDBResponse>;

    /// All kits owned by a user, most recently created first.
    async fn list_by_owner(&self, owner_user_id: UserId) -> Result<Vec<KitDBResponse>>;

    /// Whether any kit carries this name.
    async fn name_exists(&self, name: &str) -> Result<bool>;
}

/// User account storage.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserDBResponse>>;

    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Update the profile names. Fails with [`crate::db::errors::DbError::NotFound`] when no row matched.
    async fn update(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<UserDBResponse>;
}
