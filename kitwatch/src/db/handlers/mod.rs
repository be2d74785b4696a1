//! Repository implementations for database access.
//!
//! Each repository owns a clone of the shared [`sqlx::PgPool`] and implements one of the store
//! traits from [`repository`]. Every method runs exactly one statement, so no transaction spans
//! a use case.
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts and credentials lookup
//! - [`Kits`]: Kit registry
//! - [`Readings`]: Generic sensor record store, instantiated once per sensor kind

pub mod kits;
pub mod readings;
pub mod repository;
pub mod users;

pub use kits::Kits;
pub use readings::Readings;
pub use repository::{KitStore, ReadingStore, UserStore};
pub use users::Users;
