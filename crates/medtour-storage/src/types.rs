//! Storage types for the document storage abstraction layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Static description of a document collection.
///
/// `unique_fields` lists top-level fields whose string values must be unique
/// across the collection. Backends enforce them on insert and replace and
/// report collisions as [`StorageError::AlreadyExists`](crate::StorageError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionSpec {
    /// Collection name, also used as the table name by SQL backends.
    pub name: &'static str,
    /// Top-level fields carrying a uniqueness constraint.
    pub unique_fields: &'static [&'static str],
}

impl CollectionSpec {
    #[must_use]
    pub const fn new(name: &'static str, unique_fields: &'static [&'static str]) -> Self {
        Self {
            name,
            unique_fields,
        }
    }
}

/// A document as stored in the storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// The document ID.
    pub id: String,
    /// The collection the document lives in.
    pub collection: String,
    /// The full document content as JSON.
    pub document: Value,
    /// When the document was first inserted.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the document was last replaced.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl StoredDocument {
    /// Creates a new `StoredDocument` stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, collection: impl Into<String>, document: Value) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: id.into(),
            collection: collection.into(),
            document,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy carrying new content, keeping the creation time.
    #[must_use]
    pub fn replaced(&self, document: Value) -> Self {
        Self {
            id: self.id.clone(),
            collection: self.collection.clone(),
            document,
            created_at: self.created_at,
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Filter applied by [`DocumentStorage::find`](crate::DocumentStorage::find).
///
/// All comparisons operate on top-level document fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Case-insensitive substring match against any of `fields`.
    ///
    /// String fields match when they contain `needle`; array fields match when
    /// any string element contains it.
    Contains { fields: Vec<String>, needle: String },
    /// Exact string equality.
    Equals { field: String, value: String },
    /// Inclusive lexicographic range on a string field (`from <= v <= to`).
    ///
    /// Intended for canonical ISO-8601 dates, whose lexical order matches
    /// chronological order.
    Between {
        field: String,
        from: String,
        to: String,
    },
    /// Every nested filter must match.
    All(Vec<Filter>),
}

impl Filter {
    pub fn contains<I, S>(fields: I, needle: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Contains {
            fields: fields.into_iter().map(Into::into).collect(),
            needle: needle.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn between(
        field: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::Between {
            field: field.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Combines two filters, flattening nested `All` lists.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::All(mut left), Self::All(right)) => {
                left.extend(right);
                Self::All(left)
            }
            (Self::All(mut left), other) => {
                left.push(other);
                Self::All(left)
            }
            (first, Self::All(mut right)) => {
                right.insert(0, first);
                Self::All(right)
            }
            (first, second) => Self::All(vec![first, second]),
        }
    }

    /// Returns every field name referenced by this filter.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Contains { fields, .. } => fields.iter().map(String::as_str).collect(),
            Self::Equals { field, .. } | Self::Between { field, .. } => vec![field.as_str()],
            Self::All(filters) => filters.iter().flat_map(Filter::fields).collect(),
        }
    }
}
