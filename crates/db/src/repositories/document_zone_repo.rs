//! Repository for the `document_zones` table.

use sqlx::PgPool;
use wiki_core::types::DbId;

use crate::models::document_zone::DocumentZone;

/// Column list for document_zones queries.
const COLUMNS: &str = "id, document_id, created_at";

/// Provides create, lookup and delete operations for document zones.
pub struct DocumentZoneRepo;

impl DocumentZoneRepo {
    /// Make a document a zone root.
    ///
    /// Fails with a unique violation if the document already has a zone.
    pub async fn create(pool: &PgPool, document_id: DbId) -> Result<DocumentZone, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_zones (document_id)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentZone>(&query)
            .bind(document_id)
            .fetch_one(pool)
            .await
    }

    /// Find a zone by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DocumentZone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_zones WHERE id = $1");
        sqlx::query_as::<_, DocumentZone>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the zone rooted at a document.
    pub async fn find_by_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Option<DocumentZone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_zones WHERE document_id = $1");
        sqlx::query_as::<_, DocumentZone>(&query)
            .bind(document_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove the zone rooted at a document. Returns `true` if a row was deleted.
    pub async fn delete_by_document(pool: &PgPool, document_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM document_zones WHERE document_id = $1")
            .bind(document_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
