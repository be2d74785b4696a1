//! In-memory implementation of every store trait.
//!
//! Mirrors the PostgreSQL constraints the services rely on: unique user emails, kit owners and
//! reading kits must exist, and ids are assigned sequentially within a kind. `recorded_at` is the
//! wall-clock time of the insert. Data is lost on restart; it backs tests and
//! `database.type: memory`.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::{KitStore, ReadingStore, UserStore},
    models::{
        kits::{KitCreateDBRequest, KitDBResponse},
        readings::{Reading, RecordWindow, SensorRecord},
        users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use crate::types::{KitId, RecordId, UserId};

struct KindTable<R> {
    records: Vec<SensorRecord<R>>,
    last_id: RecordId,
}

impl<R> Default for KindTable<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            last_id: 0,
        }
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<UserDBResponse>,
    kits: Vec<KitDBResponse>,
    readings: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Tables {
    fn table<R: Reading>(&self) -> Option<&KindTable<R>> {
        self.readings.get(&TypeId::of::<R>()).and_then(|table| table.downcast_ref())
    }

    fn table_mut<R: Reading>(&mut self) -> Result<&mut KindTable<R>> {
        self.readings
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(KindTable::<R>::default()) as Box<dyn Any + Send + Sync>)
            .downcast_mut()
            .ok_or_else(|| DbError::Other(anyhow::anyhow!("in-memory table for {} has the wrong type", R::KIND)))
    }
}

/// Shared in-memory database. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn foreign_key_violation(table: &str, column: &str, message: String) -> DbError {
    DbError::ForeignKeyViolation {
        constraint: Some(format!("{table}_{column}_fkey")),
        table: Some(table.to_string()),
        message,
    }
}

#[async_trait::async_trait]
impl<R: Reading> ReadingStore<R> for InMemoryStore {
    async fn create(&self, kit_id: KitId, payload: &R) -> Result<SensorRecord<R>> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        if !tables.kits.iter().any(|kit| kit.id == kit_id) {
            return Err(foreign_key_violation(R::TABLE, "kit_id", format!("kit {kit_id} is not present in table \"kits\"")));
        }

        let table = tables.table_mut::<R>()?;
        // Wall-clock time, like the column default; ties in ordering fall back to the id
        let recorded_at = Utc::now();
        table.last_id += 1;

        let record = SensorRecord {
            id: table.last_id,
            kit_id,
            payload: payload.clone(),
            recorded_at,
        };
        table.records.push(record.clone());
        Ok(record)
    }

    async fn list(&self, kit_id: KitId, window: RecordWindow) -> Result<Vec<SensorRecord<R>>> {
        let tables = self.tables.read().await;
        let now = Utc::now();

        let mut records: Vec<SensorRecord<R>> = tables
            .table::<R>()
            .map(|table| {
                table
                    .records
                    .iter()
                    .filter(|record| record.kit_id == kit_id && window.contains(record.recorded_at, now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }
}

#[async_trait::async_trait]
impl KitStore for InMemoryStore {
    async fn create(&self, request: &KitCreateDBRequest) -> Result<KitDBResponse> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|user| user.id == request.owner_user_id) {
            return Err(foreign_key_violation(
                "kits",
                "owner_user_id",
                format!("user {} is not present in table \"users\"", request.owner_user_id),
            ));
        }

        let kit = KitDBResponse {
            id: tables.kits.last().map_or(1, |kit| kit.id + 1),
            owner_user_id: request.owner_user_id,
            name: request.name.clone(),
            description: request.description.clone(),
            created_at: Utc::now(),
        };
        tables.kits.push(kit.clone());
        Ok(kit)
    }

    async fn list_by_owner(&self, owner_user_id: UserId) -> Result<Vec<KitDBResponse>> {
        let tables = self.tables.read().await;
        Ok(tables.kits.iter().rev().filter(|kit| kit.owner_user_id == owner_user_id).cloned().collect())
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.kits.iter().any(|kit| kit.name == name))
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryStore {
    async fn create(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|user| user.email == request.email) {
            return Err(DbError::UniqueViolation {
                constraint: Some("users_email_unique".to_string()),
                table: Some("users".to_string()),
                message: format!("Key (email)=({}) already exists.", request.email),
            });
        }

        let user = UserDBResponse {
            id: tables.users.last().map_or(1, |user| user.id + 1),
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|user| user.email == email))
    }

    async fn update(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<UserDBResponse> {
        let mut tables = self.tables.write().await;
        let user = tables.users.iter_mut().find(|user| user.id == id).ok_or(DbError::NotFound)?;

        user.first_name = request.first_name.clone();
        user.last_name = request.last_name.clone();
        Ok(user.clone())
    }
}
