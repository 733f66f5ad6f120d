use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The parent-topic links of a document do not form a finite chain.
    #[error("Invalid document hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
