//! Role checks for lifecycle operations.

use crate::models::{ActingUser, Role};

/// Decides whether a user may act with the privileges of `required`.
pub trait PermissionChecker: Send + Sync {
    fn allows(&self, user: &ActingUser, required: Role) -> bool;
}

/// Grants access when the user's role is at or above the required one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleHierarchy;

impl PermissionChecker for RoleHierarchy {
    fn allows(&self, user: &ActingUser, required: Role) -> bool {
        user.role.at_least(required)
    }
}
