//! Use-case layer between the HTTP handlers and the stores.
//!
//! Services validate arguments before any store access and re-type store failures into
//! [`crate::errors::Error`]. They are built once in [`crate::Application::new`] and cloned into
//! every request through [`crate::AppState`].

pub mod identity;
pub mod kits;
pub mod readings;

pub use identity::IdentityService;
pub use kits::KitService;
pub use readings::{ReadingService, ReadingServices};
