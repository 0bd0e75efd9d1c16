//! Storage traits for the document storage abstraction layer.
//!
//! This module defines the core trait that all storage backends must implement.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;
use crate::types::{CollectionSpec, Filter, StoredDocument};

/// The main storage trait that all document storage backends must implement.
///
/// Implementations must be thread-safe (`Send + Sync`). Writes are single-document
/// operations; no multi-document transaction guarantee is offered.
///
/// # Example
///
/// ```ignore
/// use medtour_storage::{CollectionSpec, DocumentStorage, StorageError, StoredDocument};
///
/// async fn get_patient(
///     storage: &dyn DocumentStorage,
///     spec: &CollectionSpec,
///     id: &str,
/// ) -> Result<StoredDocument, StorageError> {
///     storage
///         .get(spec, id)
///         .await?
///         .ok_or_else(|| StorageError::not_found(spec.name, id))
/// }
/// ```
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    // ==================== CRUD Operations ====================

    /// Inserts a new document under `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the id or any of the collection's
    /// unique fields collide with an existing document.
    async fn insert(
        &self,
        spec: &CollectionSpec,
        id: &str,
        document: Value,
    ) -> Result<StoredDocument, StorageError>;

    /// Reads a document by ID.
    ///
    /// Returns `None` if the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing documents.
    async fn get(
        &self,
        spec: &CollectionSpec,
        id: &str,
    ) -> Result<Option<StoredDocument>, StorageError>;

    /// Replaces the content of an existing document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the document does not exist.
    /// Returns `StorageError::AlreadyExists` if the new content violates a
    /// uniqueness constraint held by another document.
    async fn replace(
        &self,
        spec: &CollectionSpec,
        id: &str,
        document: Value,
    ) -> Result<StoredDocument, StorageError>;

    /// Removes a document and returns its last content.
    ///
    /// Deletion is hard and never cascades to other collections.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the document does not exist.
    async fn delete(&self, spec: &CollectionSpec, id: &str)
    -> Result<StoredDocument, StorageError>;

    // ==================== Queries ====================

    /// Returns all documents matching `filter`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidDocument` for filters referencing
    /// unusable field names, or an error for infrastructure issues.
    async fn find(
        &self,
        spec: &CollectionSpec,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, StorageError>;

    /// Counts documents matching `filter`.
    async fn count(
        &self,
        spec: &CollectionSpec,
        filter: Option<&Filter>,
    ) -> Result<u64, StorageError> {
        Ok(self.find(spec, filter).await?.len() as u64)
    }

    // ==================== Metadata ====================

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
