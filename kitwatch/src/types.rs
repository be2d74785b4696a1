//! Common type definitions.
//!
//! All entity IDs are `BIGSERIAL` keys in PostgreSQL, wrapped in type aliases so that function
//! signatures say which table an id belongs to:
//!
//! - [`UserId`]: User account identifier
//! - [`KitId`]: Sensor kit identifier
//! - [`RecordId`]: Identifier of a single sensor reading or alert, unique within its kind

pub type UserId = i64;
pub type KitId = i64;
pub type RecordId = i64;
