//! Database record structures.
//!
//! - [`users`] and [`kits`] hold plain request/response rows for their tables.
//! - [`readings`] defines [`readings::SensorRecord`] and the [`readings::Reading`] codec trait.
//! - [`sensors`] holds the concrete payload of every sensor kind.

pub mod kits;
pub mod readings;
pub mod sensors;
pub mod users;
