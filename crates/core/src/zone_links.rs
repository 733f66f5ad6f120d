//! Zone management links shown on document pages.
//!
//! Two actions exist: `add` creates a new zone rooted at a document that
//! already lives inside another zone, `change` edits the zone a document is the
//! root of. Which one applies depends only on the document's place in the
//! zone hierarchy; whether it is offered depends on the user's privileges.

use serde::Serialize;

use crate::document_tree::AncestorChain;
use crate::roles::can_manage_zones;
use crate::types::DbId;

/// Default URL root of the zone administration pages.
pub const DEFAULT_ADMIN_URL_ROOT: &str = "/admin/wiki/documentzone";

/// Configuration for building zone management URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneLinkConfig {
    /// URL root of the zone administration pages, without a trailing slash.
    pub admin_url_root: String,
}

impl Default for ZoneLinkConfig {
    fn default() -> Self {
        Self {
            admin_url_root: DEFAULT_ADMIN_URL_ROOT.to_string(),
        }
    }
}

impl ZoneLinkConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                      |
    /// |-----------------------|------------------------------|
    /// | `ZONE_ADMIN_URL_ROOT` | `/admin/wiki/documentzone`   |
    pub fn from_env() -> Self {
        std::env::var("ZONE_ADMIN_URL_ROOT")
            .map(|root| Self::with_root(&root))
            .unwrap_or_default()
    }

    /// Build a configuration from an explicit URL root.
    pub fn with_root(root: &str) -> Self {
        let trimmed = root.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Self::default();
        }
        Self {
            admin_url_root: trimmed.to_string(),
        }
    }

    fn add_url(&self, document_id: DbId) -> String {
        format!("{}/add/?document={document_id}", self.admin_url_root)
    }

    fn change_url(&self, zone_id: DbId) -> String {
        format!("{}/{zone_id}/", self.admin_url_root)
    }
}

/// The privileges of the user asking for links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkUser<'a> {
    pub role: &'a str,
    pub is_superuser: bool,
}

impl LinkUser<'_> {
    pub fn can_manage_zones(&self) -> bool {
        can_manage_zones(self.role, self.is_superuser)
    }
}

/// One management action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneLink {
    pub label: &'static str,
    pub url: String,
}

/// Management actions available to a user on a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneManagementLinks {
    pub add: Option<ZoneLink>,
    pub change: Option<ZoneLink>,
}

/// Whether the chain's document is itself a zone root.
pub fn is_zone_root(chain: &AncestorChain) -> bool {
    chain.document().is_zone_root()
}

/// Whether any ancestor (not the document itself) is a zone root.
pub fn has_zone_ancestor(chain: &AncestorChain) -> bool {
    chain.ancestors().iter().any(|node| node.is_zone_root())
}

/// Zone actions `user` may perform on the chain's document.
///
/// - `change`: the document is a zone root.
/// - `add`: the document is not a zone root but sits below one.
///
/// Users without zone privileges get neither.
pub fn document_zone_management_links(
    config: &ZoneLinkConfig,
    user: LinkUser<'_>,
    chain: &AncestorChain,
) -> ZoneManagementLinks {
    if !user.can_manage_zones() {
        return ZoneManagementLinks::default();
    }

    let document = chain.document();
    let change = document.zone_id.map(|zone_id| ZoneLink {
        label: "Change zone",
        url: config.change_url(zone_id),
    });
    let add = (!is_zone_root(chain) && has_zone_ancestor(chain)).then(|| ZoneLink {
        label: "Add sub-zone",
        url: config.add_url(document.document_id),
    });

    ZoneManagementLinks { add, change }
}
