//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL, behind store traits
//! so the same services can also run on the in-memory store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Services   │  (crate::service - validation and error re-typing)
//! └──────┬──────┘
//!        │  Arc<dyn ReadingStore<R> / KitStore / UserStore>
//!        ↓
//! ┌─────────────┐        ┌───────────────┐
//! │ Repositories│   or   │ InMemoryStore │
//! └──────┬──────┘        └───────────────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Store traits and their PostgreSQL repositories
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//! - [`in_memory`]: Process-local implementation of every store trait

pub mod errors;
pub mod handlers;
pub mod in_memory;
pub mod models;
