//! Wiki document model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wiki_core::document_tree::ZoneNode;
use wiki_core::types::{DbId, Timestamp};

/// A row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub locale: String,
    pub slug: String,
    pub title: String,
    pub parent_topic_id: Option<DbId>,
    pub rendered_html: String,
    pub current_revision_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new document.
#[derive(Debug, Deserialize)]
pub struct CreateDocument {
    /// Defaults to `en-US`.
    pub locale: Option<String>,
    pub slug: String,
    pub title: String,
    pub parent_topic_id: Option<DbId>,
    pub rendered_html: Option<String>,
}

/// A document joined with its zone, as needed for ancestor walks.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentZoneRow {
    pub id: DbId,
    pub parent_topic_id: Option<DbId>,
    pub rendered_html: String,
    pub zone_id: Option<DbId>,
}

impl From<DocumentZoneRow> for ZoneNode {
    fn from(row: DocumentZoneRow) -> Self {
        ZoneNode {
            document_id: row.id,
            parent_topic_id: row.parent_topic_id,
            rendered_html: row.rendered_html,
            zone_id: row.zone_id,
        }
    }
}
