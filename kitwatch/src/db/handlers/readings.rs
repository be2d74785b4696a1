//! Generic PostgreSQL repository for sensor records.
//!
//! A single implementation serves every sensor kind; the SQL is derived once from the kind's
//! [`Reading`] table mapping when the repository is constructed.

use std::marker::PhantomData;

use crate::db::{
    errors::Result,
    handlers::repository::ReadingStore,
    models::readings::{Reading, RecordWindow, SensorRecord},
};
use crate::types::KitId;
use sqlx::{PgPool, Postgres};
use tracing::instrument;

/// SQL statements for one sensor table.
#[derive(Debug, Clone)]
struct ReadingQueries {
    insert: String,
    window: String,
    history: String,
}

impl ReadingQueries {
    fn new<R: Reading>() -> Self {
        let columns = R::COLUMNS.join(", ");
        let placeholders = (0..R::COLUMNS.len()).map(|i| format!("${}", i + 2)).collect::<Vec<_>>().join(", ");
        let select = format!("SELECT id, kit_id, recorded_at, {columns} FROM {}", R::TABLE);

        Self {
            insert: format!(
                "INSERT INTO {} (kit_id, {columns}) VALUES ($1, {placeholders}) RETURNING id, kit_id, recorded_at, {columns}",
                R::TABLE
            ),
            // id breaks ties between rows inserted in the same instant
            window: format!(
                "{select} WHERE kit_id = $1 AND recorded_at >= NOW() - make_interval(mins => $2) AND recorded_at <= NOW() \
                 ORDER BY recorded_at DESC, id DESC"
            ),
            history: format!("{select} WHERE kit_id = $1 ORDER BY recorded_at DESC, id DESC"),
        }
    }
}

pub struct Readings<R> {
    db: PgPool,
    queries: ReadingQueries,
    _kind: PhantomData<fn() -> R>,
}

impl<R: Reading> Readings<R> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            queries: ReadingQueries::new::<R>(),
            _kind: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<R: Reading> ReadingStore<R> for Readings<R> {
    #[instrument(skip(self, payload), fields(kind = R::KIND), err)]
    async fn create(&self, kit_id: KitId, payload: &R) -> Result<SensorRecord<R>> {
        let query = payload.bind(sqlx::query::<Postgres>(&self.queries.insert).bind(kit_id));
        let row = query.fetch_one(&self.db).await?;

        Ok(SensorRecord::<R>::from_row(&row)?)
    }

    #[instrument(skip(self), fields(kind = R::KIND), err)]
    async fn list(&self, kit_id: KitId, window: RecordWindow) -> Result<Vec<SensorRecord<R>>> {
        let rows = match window {
            RecordWindow::Trailing { minutes } => {
                // make_interval takes an int4; larger windows already cover the whole history
                let minutes = i32::try_from(minutes).unwrap_or(i32::MAX);
                sqlx::query::<Postgres>(&self.queries.window)
                    .bind(kit_id)
                    .bind(minutes)
                    .fetch_all(&self.db)
                    .await?
            }
            RecordWindow::All => {
                sqlx::query::<Postgres>(&self.queries.history)
                    .bind(kit_id)
                    .fetch_all(&self.db)
                    .await?
            }
        };

        // Fail fast: one undecodable row fails the whole read
        let records = rows.iter().map(SensorRecord::<R>::from_row).collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
