use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Document, DocumentQuery, OwnerFilter, Result, StoreError, Version,
    query::SortOrder,
    store::DocumentStore,
};

const COLUMNS: &str =
    "collection, id, version, owner, status, unique_key, payload, created_at, updated_at";

/// PostgreSQL-backed document store implementation.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and returns a store over a fresh pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        Ok(Document {
            collection: row.try_get("collection")?,
            id: row.try_get::<Uuid, _>("id")?,
            version: Version::new(row.try_get("version")?),
            owner: row.try_get("owner")?,
            status: row.try_get("status")?,
            unique_key: row.try_get("unique_key")?,
            payload: row.try_get("payload")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn map_write_error(e: sqlx::Error, document: &Document) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = e {
            match db_err.constraint() {
                Some("unique_collection_key") => {
                    return StoreError::UniqueViolation {
                        collection: document.collection.clone(),
                        key: document.unique_key.clone().unwrap_or_default(),
                    };
                }
                Some("documents_pkey") => {
                    return StoreError::AlreadyExists {
                        collection: document.collection.clone(),
                        id: document.id,
                    };
                }
                _ => {}
            }
        }
        StoreError::Database(e)
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert(&self, mut document: Document) -> Result<Document> {
        document.version = Version::first();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, version, owner, status, unique_key, payload, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&document.collection)
        .bind(document.id)
        .bind(document.version.as_i64())
        .bind(document.owner)
        .bind(&document.status)
        .bind(&document.unique_key)
        .bind(&document.payload)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &document))?;

        Ok(document)
    }

    async fn update(&self, mut document: Document, expected: Version) -> Result<Document> {
        let mut tx = self.pool.begin().await?;

        let current: Option<PgRow> = sqlx::query(
            "SELECT version, created_at FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(&document.collection)
        .bind(document.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Err(StoreError::NotFound {
                collection: document.collection,
                id: document.id,
            });
        };

        let actual = Version::new(current.try_get("version")?);
        if actual != expected {
            return Err(StoreError::ConcurrencyConflict {
                collection: document.collection,
                id: document.id,
                expected,
                actual,
            });
        }

        document.version = expected.next();
        document.created_at = current.try_get("created_at")?;
        document.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE documents
            SET version = $3, owner = $4, status = $5, unique_key = $6, payload = $7, updated_at = $8
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(&document.collection)
        .bind(document.id)
        .bind(document.version.as_i64())
        .bind(document.owner)
        .bind(&document.status)
        .bind(&document.unique_key)
        .bind(&document.payload)
        .bind(document.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::map_write_error(e, &document))?;

        tx.commit().await?;
        Ok(document)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn get_by_unique_key(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND unique_key = $2"
        ))
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        let mut sql = format!("SELECT {COLUMNS} FROM documents WHERE collection = $1");
        let mut param_count = 1;

        // Build dynamic query
        match query.owner {
            OwnerFilter::Any => {}
            OwnerFilter::Unowned => sql.push_str(" AND owner IS NULL"),
            OwnerFilter::Is(_) => {
                param_count += 1;
                sql.push_str(&format!(" AND owner = ${param_count}"));
            }
            OwnerFilter::UnownedOr(_) => {
                param_count += 1;
                sql.push_str(&format!(" AND (owner IS NULL OR owner = ${param_count})"));
            }
        }
        if query.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }

        match query.order {
            SortOrder::OldestFirst => sql.push_str(" ORDER BY created_at ASC, seq ASC"),
            SortOrder::NewestFirst => sql.push_str(" ORDER BY created_at DESC, seq DESC"),
        }

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql).bind(&query.collection);

        if let OwnerFilter::Is(owner) | OwnerFilter::UnownedOr(owner) = query.owner {
            sqlx_query = sqlx_query.bind(owner);
        }
        if let Some(status) = &query.status {
            sqlx_query = sqlx_query.bind(status);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_document).collect()
    }
}
