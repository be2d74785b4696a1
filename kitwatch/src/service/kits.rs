//! Kit registry use cases.

use std::sync::Arc;

use tracing::instrument;

use crate::db::{
    errors::DbError,
    handlers::KitStore,
    models::kits::{KitCreateDBRequest, KitDBResponse},
};
use crate::errors::{Error, Result};
use crate::types::UserId;

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 100;

#[derive(Clone)]
pub struct KitService {
    store: Arc<dyn KitStore>,
}

impl KitService {
    pub fn new(store: Arc<dyn KitStore>) -> Self {
        Self { store }
    }

    /// Register a kit for `owner_user_id`. Names are trimmed and need not be unique.
    #[instrument(skip(self, description), err)]
    pub async fn create(&self, owner_user_id: UserId, name: &str, description: &str) -> Result<KitDBResponse> {
        let name = name.trim();
        let chars = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
            return Err(Error::InvalidArgument {
                message: format!("name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"),
            });
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::InvalidArgument {
                message: "description is required".to_string(),
            });
        }

        let request = KitCreateDBRequest {
            owner_user_id,
            name: name.to_string(),
            description: description.to_string(),
        };
        self.store.create(&request).await.map_err(|err| match err {
            // The owner id comes from a verified token; a missing row means the account is gone
            DbError::ForeignKeyViolation { .. } => Error::NotFound {
                resource: "User".to_string(),
                id: owner_user_id.to_string(),
            },
            other => Error::from_store(other, "create kit"),
        })
    }

    /// Kits owned by `owner_user_id`, newest first.
    #[instrument(skip(self), err)]
    pub async fn list_for_owner(&self, owner_user_id: UserId) -> Result<Vec<KitDBResponse>> {
        self.store
            .list_by_owner(owner_user_id)
            .await
            .map_err(|err| Error::from_store(err, "list kits"))
    }

    /// Whether a kit code has already been claimed.
    #[instrument(skip(self), err)]
    pub async fn code_exists(&self, code: &str) -> Result<bool> {
        self.store
            .name_exists(code.trim())
            .await
            .map_err(|err| Error::from_store(err, "look up kit code"))
    }
}
