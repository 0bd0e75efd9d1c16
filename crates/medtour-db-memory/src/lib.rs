//! In-memory document storage backend for the MedTour server.
//!
//! This crate provides an in-memory implementation of the `DocumentStorage` trait
//! from `medtour-storage`, using a papaya lock-free HashMap for concurrent reads.
//!
//! # Example
//!
//! ```ignore
//! use medtour_db_memory::InMemoryStorage;
//! use medtour_storage::{CollectionSpec, DocumentStorage};
//!
//! const HOSPITALS: CollectionSpec = CollectionSpec::new("hospitals", &["name"]);
//!
//! let storage = InMemoryStorage::new();
//! let doc = serde_json::json!({ "name": "Apollo Hospitals" });
//! let created = storage.insert(&HOSPITALS, "h-1", doc).await?;
//! ```

pub mod query;
pub mod storage;

pub use medtour_storage::{DocumentStorage, DynStorage, StorageError, StoredDocument};
pub use query::matches;
pub use storage::{InMemoryStorage, StorageKey};

/// Creates a new in-memory DocumentStorage instance.
pub fn create_storage() -> DynStorage {
    std::sync::Arc::new(InMemoryStorage::new())
}
