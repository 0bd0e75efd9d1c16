//! Schema management for the PostgreSQL storage backend.
//!
//! Each collection gets its own table holding JSONB documents. Tables and
//! their unique indexes are created on first use, so a server can start
//! before the database is reachable.

use std::sync::Arc;

use dashmap::DashSet;
use medtour_storage::CollectionSpec;
use sqlx_postgres::PgPool;
use tracing::{debug, info, instrument};

use crate::error::{PostgresError, Result};

/// Manages the database schema for document collections.
///
/// # Table Structure
///
/// For each collection (e.g., "patients"), the manager creates:
/// - A table (`patients`) with `id`, `doc` (JSONB), an insertion sequence and timestamps
/// - One unique expression index per unique field: `patients_email_key ON ((doc->>'email'))`
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: PgPool,
    /// Cache of collections whose schema has been ensured.
    ensured: Arc<DashSet<&'static str>>,
}

impl SchemaManager {
    /// Creates a new `SchemaManager` with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            ensured: Arc::new(DashSet::new()),
        }
    }

    /// Returns `true` if `name` is safe to splice into SQL as an identifier.
    #[must_use]
    pub fn is_valid_identifier(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= 48
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Name of the unique index backing `field`.
    #[must_use]
    pub fn unique_index_name(table: &str, field: &str) -> String {
        format!("{table}_{field}_key")
    }

    /// Ensures the table and unique indexes exist for the given collection.
    ///
    /// Idempotent and cached; a failed attempt is retried on the next call.
    #[instrument(skip(self, spec), fields(collection = %spec.name))]
    pub async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<()> {
        if self.ensured.contains(spec.name) {
            return Ok(());
        }

        if !Self::is_valid_identifier(spec.name) {
            return Err(PostgresError::schema(format!(
                "invalid collection name: {}",
                spec.name
            )));
        }

        info!("Ensuring schema for collection: {}", spec.name);
        for sql in Self::ddl(spec)? {
            sqlx_core::query::query(&sql).execute(&self.pool).await?;
        }

        debug!("Schema for {} ready", spec.name);
        self.ensured.insert(spec.name);
        Ok(())
    }

    /// DDL statements for a collection.
    pub(crate) fn ddl(spec: &CollectionSpec) -> Result<Vec<String>> {
        let table = spec.name;
        let mut statements = vec![format!(
            r#"CREATE TABLE IF NOT EXISTS "{table}" (
                id TEXT PRIMARY KEY,
                doc JSONB NOT NULL,
                seq BIGSERIAL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#
        )];

        for field in spec.unique_fields {
            if !Self::is_valid_identifier(field) {
                return Err(PostgresError::schema(format!(
                    "invalid unique field name: {field}"
                )));
            }
            let index = Self::unique_index_name(table, field);
            statements.push(format!(
                r#"CREATE UNIQUE INDEX IF NOT EXISTS "{index}" ON "{table}" ((doc->>'{field}'))"#
            ));
        }

        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(SchemaManager::is_valid_identifier("patients"));
        assert!(SchemaManager::is_valid_identifier("contact_person"));
        assert!(!SchemaManager::is_valid_identifier(""));
        assert!(!SchemaManager::is_valid_identifier("name'; DROP TABLE x; --"));
        assert!(!SchemaManager::is_valid_identifier("doc->>x"));
    }

    #[test]
    fn test_ddl_creates_one_index_per_unique_field() {
        const USERS: CollectionSpec = CollectionSpec::new("users", &["email"]);
        let ddl = SchemaManager::ddl(&USERS).unwrap();
        assert_eq!(ddl.len(), 2);
        assert!(ddl[0].contains(r#"CREATE TABLE IF NOT EXISTS "users""#));
        assert!(ddl[1].contains(r#""users_email_key""#));
        assert!(ddl[1].contains("(doc->>'email')"));
    }

    #[test]
    fn test_ddl_rejects_bad_field() {
        const BAD: CollectionSpec = CollectionSpec::new("users", &["e mail"]);
        assert!(SchemaManager::ddl(&BAD).is_err());
    }
}
