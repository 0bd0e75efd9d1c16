//! PostgreSQL implementation of the DocumentStorage trait.

use async_trait::async_trait;
use serde_json::Value;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::{PgPool, Postgres};
use time::OffsetDateTime;
use tracing::debug;

use medtour_storage::{CollectionSpec, DocumentStorage, Filter, StorageError, StoredDocument};

use crate::config::PostgresConfig;
use crate::error::map_sqlx_error;
use crate::pool;
use crate::schema::SchemaManager;
use crate::sql::where_clause;

type Row = (String, Value, OffsetDateTime, OffsetDateTime);

const COLUMNS: &str = "id, doc, created_at, updated_at";

fn to_stored(spec: &CollectionSpec, row: Row) -> StoredDocument {
    let (id, document, created_at, updated_at) = row;
    StoredDocument {
        id,
        collection: spec.name.to_string(),
        document,
        created_at,
        updated_at,
    }
}

/// PostgreSQL storage backend for MedTour documents.
///
/// Each collection maps to a table of JSONB documents. Tables are created on
/// first use and unique fields are backed by unique expression indexes.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
    schema: SchemaManager,
}

impl PostgresStorage {
    /// Creates a new `PostgresStorage` with the given configuration.
    ///
    /// The pool connects lazily, so this succeeds while the database is down;
    /// operations report `ConnectionError` until it comes back.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or URL is invalid.
    pub fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config)?;
        Ok(Self::from_pool(pool))
    }

    /// Creates a new `PostgresStorage` from an existing connection pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        let schema = SchemaManager::new(pool.clone());
        Self { pool, schema }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure(&self, spec: &CollectionSpec) -> Result<(), StorageError> {
        self.schema.ensure_collection(spec).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStorage for PostgresStorage {
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
        self.ensure(spec).await?;

        let table = spec.name;
        let sql = format!(
            r#"INSERT INTO "{table}" (id, doc) VALUES ($1, $2) RETURNING {COLUMNS}"#
        );
        let row: Row = query_as::<Postgres, Row>(&sql)
            .bind(id)
            .bind(&document)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        debug!(collection = table, id, "document inserted");
        Ok(to_stored(spec, row))
    }

    async fn get(
        &self,
        spec: &CollectionSpec,
        id: &str,
    ) -> Result<Option<StoredDocument>, StorageError> {
        self.ensure(spec).await?;

        let table = spec.name;
        let sql = format!(r#"SELECT {COLUMNS} FROM "{table}" WHERE id = $1"#);
        let row: Option<Row> = query_as::<Postgres, Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        Ok(row.map(|row| to_stored(spec, row)))
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
        self.ensure(spec).await?;

        let table = spec.name;
        let sql = format!(
            r#"UPDATE "{table}" SET doc = $2, updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"#
        );
        let row: Option<Row> = query_as::<Postgres, Row>(&sql)
            .bind(id)
            .bind(&document)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        row.map(|row| to_stored(spec, row))
            .ok_or_else(|| StorageError::not_found(table, id))
    }

    async fn delete(
        &self,
        spec: &CollectionSpec,
        id: &str,
    ) -> Result<StoredDocument, StorageError> {
        self.ensure(spec).await?;

        let table = spec.name;
        let sql = format!(r#"DELETE FROM "{table}" WHERE id = $1 RETURNING {COLUMNS}"#);
        let row: Option<Row> = query_as::<Postgres, Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        row.map(|row| to_stored(spec, row))
            .ok_or_else(|| StorageError::not_found(table, id))
    }

    async fn find(
        &self,
        spec: &CollectionSpec,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, StorageError> {
        let clause = where_clause(filter, 1)?;
        self.ensure(spec).await?;

        let table = spec.name;
        let sql = format!(
            r#"SELECT {COLUMNS} FROM "{table}" WHERE {} ORDER BY seq"#,
            clause.sql
        );
        let mut query = query_as::<Postgres, Row>(&sql);
        for value in &clause.binds {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        Ok(rows.into_iter().map(|row| to_stored(spec, row)).collect())
    }

    async fn count(
        &self,
        spec: &CollectionSpec,
        filter: Option<&Filter>,
    ) -> Result<u64, StorageError> {
        let clause = where_clause(filter, 1)?;
        self.ensure(spec).await?;

        let table = spec.name;
        let sql = format!(r#"SELECT COUNT(*) FROM "{table}" WHERE {}"#, clause.sql);
        let mut query = query_scalar::<Postgres, i64>(&sql);
        for value in &clause.binds {
            query = query.bind(value);
        }
        let count = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        pool::test_connection(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
