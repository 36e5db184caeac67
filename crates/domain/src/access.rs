//! Role checks against the authenticated principal claim.

use common::{Principal, Role};

use crate::error::DomainError;

/// Fails with `Unauthorized` unless the principal is an administrator.
pub fn require_admin(principal: &Principal, action: &'static str) -> Result<(), DomainError> {
    if principal.is_admin() {
        Ok(())
    } else {
        tracing::warn!(principal = %principal.id, action, "admin role required");
        Err(DomainError::Unauthorized {
            action,
            required: Role::Admin,
        })
    }
}
