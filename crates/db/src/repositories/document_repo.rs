//! Repository for the `documents` table.

use sqlx::PgPool;
use wiki_core::document_tree::ZoneNode;
use wiki_core::types::DbId;

use crate::models::document::{CreateDocument, Document, DocumentZoneRow};

/// Column list for documents queries.
const COLUMNS: &str = "id, locale, slug, title, parent_topic_id, rendered_html, \
    current_revision_id, created_at, updated_at";

/// Locale used when a create DTO does not name one.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Provides CRUD operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDocument) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (locale, slug, title, parent_topic_id, rendered_html)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(input.locale.as_deref().unwrap_or(DEFAULT_LOCALE))
            .bind(&input.slug)
            .bind(&input.title)
            .bind(input.parent_topic_id)
            .bind(input.rendered_html.as_deref().unwrap_or(""))
            .fetch_one(pool)
            .await
    }

    /// Find a document by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a document by locale and slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        locale: &str,
        slug: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE locale = $1 AND slug = $2");
        sqlx::query_as::<_, Document>(&query)
            .bind(locale)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List the direct children of a document, ordered by slug.
    pub async fn list_children(pool: &PgPool, id: DbId) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE parent_topic_id = $1
             ORDER BY slug"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_all(pool)
            .await
    }

    /// Move a document under a new parent topic (or to the top level).
    ///
    /// Returns `None` if no row with the given `id` exists. Cycles are not
    /// rejected here; ancestor walks detect them.
    pub async fn set_parent_topic(
        pool: &PgPool,
        id: DbId,
        parent_topic_id: Option<DbId>,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET parent_topic_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(parent_topic_id)
            .fetch_optional(pool)
            .await
    }

    /// Store freshly rendered HTML for a document.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_rendered_html(
        pool: &PgPool,
        id: DbId,
        rendered_html: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET rendered_html = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(rendered_html)
            .fetch_optional(pool)
            .await
    }

    /// Load the zone-relevant view of a document: parent link, rendered HTML
    /// and the id of the zone it roots, if any.
    pub async fn find_zone_node(pool: &PgPool, id: DbId) -> Result<Option<ZoneNode>, sqlx::Error> {
        let row = sqlx::query_as::<_, DocumentZoneRow>(
            "SELECT d.id, d.parent_topic_id, d.rendered_html, z.id AS zone_id
             FROM documents d
             LEFT JOIN document_zones z ON z.document_id = d.id
             WHERE d.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(ZoneNode::from))
    }
}
