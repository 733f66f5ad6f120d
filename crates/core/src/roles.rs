//! Well-known role name constants.
//!
//! These must match the `users_role_check` constraint in
//! `20260301000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_READER: &str = "reader";

/// All roles a user row may carry.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR, ROLE_READER];

/// Whether a user may create or change document zones.
///
/// Only administrators manage zones; superuser accounts are treated as
/// administrators regardless of their stored role.
pub fn can_manage_zones(role: &str, is_superuser: bool) -> bool {
    is_superuser || role == ROLE_ADMIN
}
