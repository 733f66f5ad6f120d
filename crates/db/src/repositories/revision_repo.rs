//! Repository for the `revisions` table.
//!
//! Revisions are immutable: there is no update or delete. Recording an
//! approved revision also makes it the document's current revision.

use sqlx::PgPool;
use wiki_core::types::DbId;

use crate::models::revision::{CreateRevision, Revision, RevisionWithLocale};

/// Column list for revisions queries.
const COLUMNS: &str =
    "id, document_id, title, content, comment, creator_id, is_approved, created_at";

/// Provides create and read operations for revisions.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Record a new revision.
    ///
    /// Approved revisions become the document's current revision and update
    /// its title, in the same transaction.
    pub async fn create(pool: &PgPool, input: &CreateRevision) -> Result<Revision, sqlx::Error> {
        let is_approved = input.is_approved.unwrap_or(true);
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO revisions (document_id, title, content, comment, creator_id, is_approved)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let revision = sqlx::query_as::<_, Revision>(&query)
            .bind(input.document_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.comment)
            .bind(input.creator_id)
            .bind(is_approved)
            .fetch_one(&mut *tx)
            .await?;

        if is_approved {
            sqlx::query(
                "UPDATE documents SET current_revision_id = $2, title = $3, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(revision.document_id)
            .bind(revision.id)
            .bind(&revision.title)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(revision)
    }

    /// Find a revision by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Revision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM revisions WHERE id = $1");
        sqlx::query_as::<_, Revision>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all revisions of a document, newest first.
    pub async fn list_by_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<Revision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE document_id = $1
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// The revision recorded just before `revision` on the same document.
    pub async fn find_previous(
        pool: &PgPool,
        revision: &Revision,
    ) -> Result<Option<Revision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE document_id = $1 AND id < $2
             ORDER BY id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(revision.document_id)
            .bind(revision.id)
            .fetch_optional(pool)
            .await
    }

    /// Find a revision together with its document's locale.
    pub async fn find_with_locale(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RevisionWithLocale>, sqlx::Error> {
        sqlx::query_as::<_, RevisionWithLocale>(
            "SELECT r.id, d.locale, r.content
             FROM revisions r
             JOIN documents d ON d.id = r.document_id
             WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
