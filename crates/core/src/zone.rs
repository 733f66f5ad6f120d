//! Zone section inheritance.
//!
//! A zone root marks a subtree of documents that share named sections (for
//! example a `links` sidebar). A document inside the zone uses its own copy of
//! a section when its rendered HTML defines one, and otherwise inherits the
//! nearest ancestor's copy. Ancestors above the outermost zone root are not
//! part of any zone and are never consulted.

use crate::document_tree::{AncestorChain, ZoneNode};
use crate::section::{has_section, section_extract};

/// The document in `chain` whose content supplies `section_id`, if any.
pub fn zone_section_source<'a>(
    chain: &'a AncestorChain,
    section_id: &str,
) -> Option<&'a ZoneNode> {
    let outermost = chain.outermost_zone_index()?;
    chain.nodes()[..=outermost]
        .iter()
        .find(|node| has_section(&node.rendered_html, section_id))
}

/// Content of the zone section `section_id` as seen from the chain's document.
///
/// Returns `None` when the document is not inside a zone or no document
/// between it and the outermost zone root defines the section.
pub fn zone_section_extract(chain: &AncestorChain, section_id: &str) -> Option<String> {
    zone_section_source(chain, section_id)
        .map(|node| section_extract(&node.rendered_html, section_id))
}
