//! Generic CRUD over one record collection.

use std::marker::PhantomData;

use medtour_storage::{DynStorage, Filter, StoredDocument};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{CoreError, Result};
use crate::id::generate_id;
use crate::record::Record;
use crate::search;

/// CRUD operations for records of type `T`.
///
/// Deleting never cascades: references held by other collections are
/// denormalized names or ids and are left as they are.
pub struct Repository<T: Record> {
    storage: DynStorage,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(storage: DynStorage) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    fn storage_err(err: medtour_storage::StorageError) -> CoreError {
        CoreError::from_storage(T::ENTITY, err)
    }

    fn decode(doc: StoredDocument) -> Result<T> {
        serde_json::from_value(doc.document).map_err(|e| {
            CoreError::internal(format!(
                "stored {} {} is malformed: {e}",
                T::ENTITY,
                doc.id
            ))
        })
    }

    /// Lists records in insertion order.
    ///
    /// With a query, only records whose search fields contain it are returned;
    /// a blank query matches nothing.
    #[instrument(skip(self), fields(collection = T::COLLECTION.name))]
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<T>> {
        match query {
            None => self.find(None).await,
            Some(query) => match search::filter_for::<T>(query) {
                Some(filter) => self.find(Some(&filter)).await,
                None => Ok(Vec::new()),
            },
        }
    }

    /// Records matching `filter`, in insertion order.
    pub async fn find(&self, filter: Option<&Filter>) -> Result<Vec<T>> {
        let docs = self
            .storage
            .find(&T::COLLECTION, filter)
            .await
            .map_err(Self::storage_err)?;
        docs.into_iter().map(Self::decode).collect()
    }

    pub async fn count(&self, filter: Option<&Filter>) -> Result<u64> {
        self.storage
            .count(&T::COLLECTION, filter)
            .await
            .map_err(Self::storage_err)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION.name))]
    pub async fn get(&self, id: &str) -> Result<T> {
        let doc = self
            .storage
            .get(&T::COLLECTION, id)
            .await
            .map_err(Self::storage_err)?
            .ok_or_else(|| CoreError::not_found(T::ENTITY, id))?;
        Self::decode(doc)
    }

    /// Validates and inserts a record under a fresh id.
    pub async fn create(&self, record: T) -> Result<T> {
        self.create_with(record, |_| {}).await
    }

    /// Creates a record from a raw request body. Any client `_id` is ignored.
    pub async fn create_from_value(&self, body: Value) -> Result<T> {
        let record: T = serde_json::from_value(strip_fields::<T>(body)?)?;
        self.create(record).await
    }

    /// Like [`create`](Self::create), letting the caller add stored-only fields.
    pub(crate) async fn create_with(
        &self,
        mut record: T,
        extend: impl FnOnce(&mut serde_json::Map<String, Value>),
    ) -> Result<T> {
        record.validate()?;
        record.set_id(generate_id());

        let mut document = serde_json::to_value(&record)?;
        if let Value::Object(map) = &mut document {
            extend(map);
        }

        self.storage
            .insert(&T::COLLECTION, record.id(), document)
            .await
            .map_err(Self::storage_err)?;

        debug!(entity = T::ENTITY, id = record.id(), "record created");
        Ok(record)
    }

    /// Applies `patch` as a JSON merge patch and re-validates the result.
    ///
    /// `_id` and protected fields in the patch are ignored; protected fields
    /// already stored are carried over untouched.
    #[instrument(skip(self, patch), fields(collection = T::COLLECTION.name))]
    pub async fn update(&self, id: &str, patch: Value) -> Result<T> {
        let patch = strip_fields::<T>(patch)?;

        let stored = self
            .storage
            .get(&T::COLLECTION, id)
            .await
            .map_err(Self::storage_err)?
            .ok_or_else(|| CoreError::not_found(T::ENTITY, id))?;

        let mut merged = stored.document.clone();
        json_patch::merge(&mut merged, &patch);

        let mut record: T = serde_json::from_value(merged)?;
        record.set_id(id.to_string());
        record.validate()?;

        let mut document = serde_json::to_value(&record)?;
        if let (Value::Object(next), Value::Object(previous)) = (&mut document, &stored.document) {
            for field in T::PROTECTED_FIELDS {
                if let Some(value) = previous.get(*field) {
                    next.insert((*field).to_string(), value.clone());
                }
            }
        }

        self.storage
            .replace(&T::COLLECTION, id, document)
            .await
            .map_err(Self::storage_err)?;

        debug!(entity = T::ENTITY, id, "record updated");
        Ok(record)
    }

    /// Hard-deletes a record.
    #[instrument(skip(self), fields(collection = T::COLLECTION.name))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.storage
            .delete(&T::COLLECTION, id)
            .await
            .map_err(Self::storage_err)?;
        debug!(entity = T::ENTITY, id, "record deleted");
        Ok(())
    }
}

/// Drops `_id` and protected fields from a request body, which must be an object.
fn strip_fields<T: Record>(body: Value) -> Result<Value> {
    let Value::Object(mut map) = body else {
        return Err(CoreError::validation("request body must be a JSON object"));
    };
    map.remove("_id");
    for field in T::PROTECTED_FIELDS {
        map.remove(*field);
    }
    Ok(Value::Object(map))
}
