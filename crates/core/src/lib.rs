//! Content helpers for the wiki: section editing, revision diffs, zone
//! inheritance and zone management links.
//!
//! This crate has no storage dependencies. Callers load documents and
//! revisions (see `wiki-db`) and hand plain values to these functions.

pub mod document_tree;
pub mod error;
pub mod html;
pub mod revision_diff;
pub mod roles;
pub mod section;
pub mod types;
pub mod zone;
pub mod zone_links;
