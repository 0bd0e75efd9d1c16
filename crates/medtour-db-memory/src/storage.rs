use crate::query;
use async_trait::async_trait;
use medtour_storage::{CollectionSpec, DocumentStorage, Filter, StorageError, StoredDocument};
use papaya::HashMap as PapayaHashMap;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

pub type StorageKey = String; // Format: "collection/id"

pub(crate) fn make_storage_key(collection: &str, id: &str) -> StorageKey {
    format!("{collection}/{id}")
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    /// Insertion sequence, used to return finds in insertion order.
    seq: u64,
    stored: StoredDocument,
}

/// In-memory document storage backend using papaya lock-free HashMap.
///
/// This storage implementation provides:
/// - Lock-free concurrent reads via papaya::HashMap
/// - Full CRUD operations
/// - Unique-field enforcement, atomic with the write
/// - Filtered finds in insertion order
#[derive(Debug)]
pub struct InMemoryStorage {
    /// Main storage using papaya for lock-free concurrent access
    pub(crate) data: Arc<PapayaHashMap<StorageKey, Entry>>,
    /// Serializes writes so a uniqueness check and its insert cannot interleave
    write_gate: Mutex<()>,
    /// Atomic counter for insertion order
    seq_counter: AtomicU64,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    pub fn new() -> Self {
        Self {
            data: Arc::new(PapayaHashMap::new()),
            write_gate: Mutex::new(()),
            seq_counter: AtomicU64::new(1),
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Total number of documents across all collections.
    pub fn len(&self) -> usize {
        self.data.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a collection's entries in insertion order.
    fn collection_entries(&self, collection: &str) -> Vec<Entry> {
        let prefix = format!("{collection}/");
        let guard = self.data.pin();
        let mut entries: Vec<Entry> = guard
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, entry)| entry.clone())
            .collect();
        entries.sort_by_key(|e| e.seq);
        entries
    }

    /// Finds the first unique field of `document` already held by another document.
    ///
    /// Must be called with the write gate held.
    fn unique_violation(
        &self,
        spec: &CollectionSpec,
        id: &str,
        document: &Value,
    ) -> Option<&'static str> {
        if spec.unique_fields.is_empty() {
            return None;
        }
        let others = self.collection_entries(spec.name);
        spec.unique_fields.iter().copied().find(|field| {
            let Some(value) = document.get(*field).filter(|v| !v.is_null()) else {
                return false;
            };
            others
                .iter()
                .filter(|e| e.stored.id != id)
                .any(|e| e.stored.document.get(*field) == Some(value))
        })
    }
}

#[async_trait]
impl DocumentStorage for InMemoryStorage {
    async fn insert(
        &self,
        spec: &CollectionSpec,
        id: &str,
        document: Value,
    ) -> Result<StoredDocument, StorageError> {
        if !document.is_object() {
            return Err(StorageError::invalid_document(
                "document must be a JSON object",
            ));
        }

        let _gate = self.write_gate.lock().await;
        let key = make_storage_key(spec.name, id);

        if self.data.pin().contains_key(&key) {
            return Err(StorageError::already_exists(spec.name, "_id"));
        }
        if let Some(field) = self.unique_violation(spec, id, &document) {
            debug!(
                collection = spec.name,
                field,
                "unique constraint rejected insert"
            );
            return Err(StorageError::already_exists(spec.name, field));
        }

        let stored = StoredDocument::new(id, spec.name, document);
        let entry = Entry {
            seq: self.next_seq(),
            stored: stored.clone(),
        };
        self.data.pin().insert(key, entry);
        Ok(stored)
    }

    async fn get(
        &self,
        spec: &CollectionSpec,
        id: &str,
    ) -> Result<Option<StoredDocument>, StorageError> {
        let key = make_storage_key(spec.name, id);
        let guard = self.data.pin();
        Ok(guard.get(&key).map(|entry| entry.stored.clone()))
    }

    async fn replace(
        &self,
        spec: &CollectionSpec,
        id: &str,
        document: Value,
    ) -> Result<StoredDocument, StorageError> {
        if !document.is_object() {
            return Err(StorageError::invalid_document(
                "document must be a JSON object",
            ));
        }

        let _gate = self.write_gate.lock().await;
        let key = make_storage_key(spec.name, id);

        let existing = self
            .data
            .pin()
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(spec.name, id))?;

        if let Some(field) = self.unique_violation(spec, id, &document) {
            debug!(
                collection = spec.name,
                field,
                "unique constraint rejected replace"
            );
            return Err(StorageError::already_exists(spec.name, field));
        }

        let stored = existing.stored.replaced(document);
        let entry = Entry {
            seq: existing.seq,
            stored: stored.clone(),
        };
        self.data.pin().insert(key, entry);
        Ok(stored)
    }

    async fn delete(
        &self,
        spec: &CollectionSpec,
        id: &str,
    ) -> Result<StoredDocument, StorageError> {
        let _gate = self.write_gate.lock().await;
        let key = make_storage_key(spec.name, id);
        let guard = self.data.pin();
        guard
            .remove(&key)
            .map(|entry| entry.stored.clone())
            .ok_or_else(|| StorageError::not_found(spec.name, id))
    }

    async fn find(
        &self,
        spec: &CollectionSpec,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, StorageError> {
        let keep = |doc: &Value| filter.is_none_or(|f| query::matches(f, doc));
        Ok(self
            .collection_entries(spec.name)
            .into_iter()
            .filter(|e| keep(&e.stored.document))
            .map(|e| e.stored)
            .collect())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
