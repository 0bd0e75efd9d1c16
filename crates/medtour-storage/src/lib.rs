//! # medtour-storage
//!
//! Storage abstraction layer for the MedTour server.
//!
//! This crate defines the traits and types that all storage backends must implement.
//! It does not contain any implementations - those are provided by separate crates
//! (`medtour-db-memory`, `medtour-db-postgres`).
//!
//! ## Overview
//!
//! The main trait is [`DocumentStorage`]. A backend keeps one collection of JSON
//! documents per record type and provides:
//! - CRUD operations keyed by document id
//! - Filtered finds (substring, equality and inclusive range filters)
//! - Uniqueness constraints declared per collection in a [`CollectionSpec`]
//!
//! ## Example
//!
//! ```ignore
//! use medtour_storage::{CollectionSpec, DocumentStorage, Filter, StorageError};
//!
//! const HOSPITALS: CollectionSpec = CollectionSpec::new("hospitals", &["name"]);
//!
//! async fn hospitals_in(
//!     storage: &dyn DocumentStorage,
//!     country: &str,
//! ) -> Result<usize, StorageError> {
//!     let filter = Filter::equals("country", country);
//!     Ok(storage.find(&HOSPITALS, Some(&filter)).await?.len())
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::StorageError;
pub use traits::DocumentStorage;
pub use types::{CollectionSpec, Filter, StoredDocument};

/// Type alias for a shared storage trait object.
pub type DynStorage = std::sync::Arc<dyn DocumentStorage>;
