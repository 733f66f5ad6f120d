//! Document zone model.
//!
//! A zone carries no content of its own; it only marks its document as the
//! root of a zone.

use serde::Serialize;
use sqlx::FromRow;
use wiki_core::types::{DbId, Timestamp};

/// A row from the `document_zones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentZone {
    pub id: DbId,
    pub document_id: DbId,
    pub created_at: Timestamp,
}
