//! Database repository for kits.

use crate::db::{
    errors::Result,
    handlers::repository::KitStore,
    models::kits::{KitCreateDBRequest, KitDBResponse},
};
use crate::types::UserId;
use sqlx::PgPool;
use tracing::instrument;

pub struct Kits {
    db: PgPool,
}

impl Kits {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl KitStore for Kits {
    #[instrument(skip(self, request), fields(owner = request.owner_user_id), err)]
    async fn create(&self, request: &KitCreateDBRequest) -> Result<KitDBResponse> {
        let kit = sqlx::query_as::<_, KitDBResponse>(
            r#"
            INSERT INTO kits (owner_user_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_user_id, name, description, created_at
            "#,
        )
        .bind(request.owner_user_id)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&self.db)
        .await?;

        Ok(kit)
    }

    #[instrument(skip(self), err)]
    async fn list_by_owner(&self, owner_user_id: UserId) -> Result<Vec<KitDBResponse>> {
        let kits = sqlx::query_as::<_, KitDBResponse>(
            r#"
            SELECT id, owner_user_id, name, description, created_at
            FROM kits
            WHERE owner_user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(kits)
    }

    #[instrument(skip(self), err)]
    async fn name_exists(&self, name: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM kits WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.db)
            .await?;

        Ok(exists)
    }
}
