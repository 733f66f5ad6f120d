//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod document_repo;
pub mod document_zone_repo;
pub mod revision_repo;
pub mod user_repo;

pub use document_repo::DocumentRepo;
pub use document_zone_repo::DocumentZoneRepo;
pub use revision_repo::RevisionRepo;
pub use user_repo::UserRepo;
