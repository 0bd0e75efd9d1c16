use medtour_storage::CollectionSpec;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A domain record persisted as one document in its own collection.
///
/// The identifier is serialized as `_id`; all other fields are camelCase.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Display name used in messages ("Patient not found").
    const ENTITY: &'static str;

    /// Collection holding the records, with its unique fields.
    const COLLECTION: CollectionSpec;

    /// Fields matched by substring search. Empty for records that are not searchable.
    const SEARCH_FIELDS: &'static [&'static str] = &[];

    /// Stored fields that partial updates may never touch and reads never expose.
    const PROTECTED_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Form-level checks on top of what deserialization already enforces.
    fn validate(&self) -> Result<()>;
}

/// Implements the id accessors for a record with an `id` field.
macro_rules! record_id {
    () => {
        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    };
}

pub(crate) use record_id;
