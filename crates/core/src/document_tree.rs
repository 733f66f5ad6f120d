//! Parent-topic chains for zone resolution.
//!
//! Documents form a tree through their `parent_topic_id`. Zone helpers need a
//! document together with every ancestor, nearest first. The chain is built
//! iteratively with a visited set and a depth cap, so a corrupted hierarchy
//! (a cycle, or an absurdly deep one) is reported instead of looping.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum number of documents in a chain, the document itself included.
pub const MAX_ANCESTOR_DEPTH: usize = 64;

/// What zone helpers need to know about one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneNode {
    pub document_id: DbId,
    pub parent_topic_id: Option<DbId>,
    pub rendered_html: String,
    /// Id of the document's zone when the document is a zone root.
    pub zone_id: Option<DbId>,
}

impl ZoneNode {
    pub fn is_zone_root(&self) -> bool {
        self.zone_id.is_some()
    }
}

/// A document followed by its ancestors, nearest first.
///
/// Always contains at least the document itself. Ids are unique and each
/// node's `parent_topic_id` is the id of the node after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorChain {
    nodes: Vec<ZoneNode>,
    visited: HashSet<DbId>,
}

impl AncestorChain {
    /// Start a chain at `document`.
    pub fn new(document: ZoneNode) -> Self {
        let visited = HashSet::from([document.document_id]);
        Self {
            nodes: vec![document],
            visited,
        }
    }

    /// Build the full chain using a synchronous lookup.
    ///
    /// `lookup` returning `None` for a referenced parent is a dangling link and
    /// yields [`CoreError::NotFound`].
    pub fn build<F>(document: ZoneNode, mut lookup: F) -> Result<Self, CoreError>
    where
        F: FnMut(DbId) -> Option<ZoneNode>,
    {
        let mut chain = Self::new(document);
        while let Some(parent_id) = chain.next_parent_id() {
            let parent = lookup(parent_id).ok_or(CoreError::NotFound {
                entity: "document",
                id: parent_id,
            })?;
            chain.push_parent(parent)?;
        }
        Ok(chain)
    }

    /// Id of the parent still to be loaded, `None` once the root is reached.
    pub fn next_parent_id(&self) -> Option<DbId> {
        self.nodes.last().and_then(|node| node.parent_topic_id)
    }

    /// Append the parent of the current last node.
    pub fn push_parent(&mut self, parent: ZoneNode) -> Result<(), CoreError> {
        let expected = self.next_parent_id().ok_or_else(|| {
            CoreError::Internal(format!(
                "document {} has no parent topic to append",
                self.document().document_id
            ))
        })?;
        if parent.document_id != expected {
            return Err(CoreError::Internal(format!(
                "expected parent document {expected}, got {}",
                parent.document_id
            )));
        }
        if !self.visited.insert(parent.document_id) {
            return Err(CoreError::InvalidHierarchy(format!(
                "parent topic cycle through document {} starting at document {}",
                parent.document_id,
                self.document().document_id
            )));
        }
        if self.nodes.len() >= MAX_ANCESTOR_DEPTH {
            return Err(CoreError::InvalidHierarchy(format!(
                "document {} has more than {MAX_ANCESTOR_DEPTH} ancestors",
                self.document().document_id
            )));
        }
        self.nodes.push(parent);
        Ok(())
    }

    /// The document the chain starts at.
    pub fn document(&self) -> &ZoneNode {
        &self.nodes[0]
    }

    /// Ancestors only, nearest first.
    pub fn ancestors(&self) -> &[ZoneNode] {
        &self.nodes[1..]
    }

    /// The document followed by its ancestors.
    pub fn nodes(&self) -> &[ZoneNode] {
        &self.nodes
    }

    pub fn depth(&self) -> usize {
        self.nodes.len()
    }

    /// Position of the outermost zone root in [`Self::nodes`].
    pub fn outermost_zone_index(&self) -> Option<usize> {
        self.nodes.iter().rposition(ZoneNode::is_zone_root)
    }
}
