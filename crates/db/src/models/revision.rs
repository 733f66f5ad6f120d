//! Document revision model.
//!
//! Revisions are immutable snapshots of document content, created on every
//! edit.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wiki_core::types::{DbId, Timestamp};

/// A row from the `revisions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Revision {
    pub id: DbId,
    pub document_id: DbId,
    pub title: String,
    pub content: String,
    pub comment: Option<String>,
    pub creator_id: Option<DbId>,
    pub is_approved: bool,
    pub created_at: Timestamp,
}

/// DTO for recording a new revision.
#[derive(Debug, Deserialize)]
pub struct CreateRevision {
    pub document_id: DbId,
    pub title: String,
    pub content: String,
    pub comment: Option<String>,
    pub creator_id: Option<DbId>,
    /// Defaults to `true`. Only approved revisions become current.
    pub is_approved: Option<bool>,
}

/// A revision joined with its document's locale, as needed for diff headers.
#[derive(Debug, Clone, FromRow)]
pub struct RevisionWithLocale {
    pub id: DbId,
    pub locale: String,
    pub content: String,
}
