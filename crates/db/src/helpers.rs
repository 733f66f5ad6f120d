//! Content helpers backed by the database.
//!
//! Each helper loads the records it needs through the repositories and hands
//! them to the pure functions in `wiki_core`. Rendering layers call these
//! directly with a pool.

use sqlx::PgPool;
use wiki_core::document_tree::AncestorChain;
use wiki_core::error::CoreError;
use wiki_core::revision_diff::{self, RevisionText, DIFF_UNAVAILABLE};
use wiki_core::section::section_extract;
use wiki_core::types::DbId;
use wiki_core::zone;
use wiki_core::zone_links::{self, ZoneLinkConfig, ZoneManagementLinks};

use crate::error::HelperResult;
use crate::models::revision::RevisionWithLocale;
use crate::repositories::{DocumentRepo, RevisionRepo, UserRepo};

/// Load a document and all of its ancestors, nearest first.
///
/// Parents are fetched one query at a time. A parent link to a missing
/// document is [`CoreError::NotFound`]; a cycle or a chain deeper than
/// [`wiki_core::document_tree::MAX_ANCESTOR_DEPTH`] is
/// [`CoreError::InvalidHierarchy`].
pub async fn load_ancestor_chain(
    pool: &PgPool,
    document_id: DbId,
) -> HelperResult<AncestorChain> {
    let document = DocumentRepo::find_zone_node(pool, document_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "document",
            id: document_id,
        })?;

    let mut chain = AncestorChain::new(document);
    while let Some(parent_id) = chain.next_parent_id() {
        let parent = DocumentRepo::find_zone_node(pool, parent_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "document",
                id: parent_id,
            })?;
        if let Err(err) = chain.push_parent(parent) {
            tracing::warn!(
                document_id,
                parent_id,
                error = %err,
                "Broken parent topic hierarchy"
            );
            return Err(err.into());
        }
    }

    tracing::debug!(document_id, depth = chain.depth(), "Loaded ancestor chain");
    Ok(chain)
}

/// Unified diff between two revisions.
///
/// A missing id, or an id with no revision behind it, yields
/// [`DIFF_UNAVAILABLE`]. Only storage failures are errors.
pub async fn revisions_unified_diff(
    pool: &PgPool,
    from_id: Option<DbId>,
    to_id: Option<DbId>,
) -> HelperResult<String> {
    let (Some(from_id), Some(to_id)) = (from_id, to_id) else {
        return Ok(DIFF_UNAVAILABLE.to_string());
    };

    let from = RevisionRepo::find_with_locale(pool, from_id).await?;
    let to = RevisionRepo::find_with_locale(pool, to_id).await?;
    if from.is_none() || to.is_none() {
        tracing::debug!(from_id, to_id, "Revision missing, diff unavailable");
    }

    Ok(revision_diff::revisions_unified_diff(
        from.as_ref().map(revision_text),
        to.as_ref().map(revision_text),
    ))
}

fn revision_text(revision: &RevisionWithLocale) -> RevisionText<'_> {
    RevisionText {
        id: revision.id,
        locale: &revision.locale,
        content: &revision.content,
    }
}

/// Content of the zone section `section_id` as seen from a document.
///
/// `None` when the document is outside every zone or nothing up to the
/// outermost zone root defines the section.
pub async fn zone_section_extract(
    pool: &PgPool,
    document_id: DbId,
    section_id: &str,
) -> HelperResult<Option<String>> {
    let chain = load_ancestor_chain(pool, document_id).await?;
    let source = zone::zone_section_source(&chain, section_id);

    tracing::debug!(
        document_id,
        section_id,
        source_document_id = source.map(|node| node.document_id),
        "Resolved zone section"
    );

    Ok(source.map(|node| section_extract(&node.rendered_html, section_id)))
}

/// Zone management links a user may see on a document.
///
/// Unknown users and documents are [`CoreError::NotFound`].
pub async fn document_zone_management_links(
    pool: &PgPool,
    config: &ZoneLinkConfig,
    user_id: DbId,
    document_id: DbId,
) -> HelperResult<ZoneManagementLinks> {
    let user = UserRepo::find_by_id(pool, user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;
    let chain = load_ancestor_chain(pool, document_id).await?;
    Ok(zone_links::document_zone_management_links(
        config,
        user.as_link_user(),
        &chain,
    ))
}
