//! The generic sensor record and the codec contract every sensor kind implements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sqlx::{
    Postgres, Row,
    postgres::{PgArguments, PgRow},
    query::Query,
};
use std::fmt;
use utoipa::ToSchema;

use crate::types::{KitId, RecordId};

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Kind-specific payload of a sensor record, plus its table mapping.
///
/// One implementation per sensor kind is all that is needed to get a store, a use case and the
/// HTTP endpoints for that kind.
pub trait Reading: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Name used in logs, messages and OpenAPI tags
    const KIND: &'static str;
    /// Table holding records of this kind
    const TABLE: &'static str;
    /// Payload columns, in the order [`Reading::bind`] binds them
    const COLUMNS: &'static [&'static str];

    /// Check payload ranges. The error is a user-facing message.
    fn validate(&self) -> Result<(), String>;

    /// Bind payload values in [`Reading::COLUMNS`] order.
    fn bind<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;

    /// Decode the payload columns of a row.
    fn decode(row: &PgRow) -> Result<Self, sqlx::Error>;
}

/// One timestamped reading attributed to a kit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SensorRecord<R> {
    pub id: RecordId,
    pub kit_id: KitId,
    #[serde(flatten)]
    pub payload: R,
    /// Assigned by the store at insertion time
    pub recorded_at: DateTime<Utc>,
}

impl<R: Reading> SensorRecord<R> {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            kit_id: row.try_get("kit_id")?,
            payload: R::decode(row)?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}

/// Which records of a kit a read covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordWindow {
    /// Records with `recorded_at` in `[now - minutes, now]`
    Trailing { minutes: i64 },
    /// The whole history
    All,
}

impl RecordWindow {
    pub fn contains(&self, recorded_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match *self {
            RecordWindow::Trailing { minutes } => {
                // A window reaching past the representable range starts at the beginning of time
                let since = chrono::Duration::try_minutes(minutes).and_then(|span| now.checked_sub_signed(span));
                recorded_at <= now && since.is_none_or(|since| recorded_at >= since)
            }
            RecordWindow::All => true,
        }
    }
}
