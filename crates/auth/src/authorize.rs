use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires role '{0}'")]
    Forbidden(Role),
}

/// Authorize a principal for an operation gated on a single role.
///
/// - No IO
/// - No panics
/// - Exact match (roles do not imply each other)
pub fn require_role(principal: &Principal, required: &Role) -> Result<(), AuthzError> {
    if &principal.role == required {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defaultdesk_core::UserId;

    #[test]
    fn roles_do_not_imply_each_other() {
        let approver = Principal::new(UserId::new(), Role::APPROVER);
        assert_eq!(require_role(&approver, &Role::APPROVER), Ok(()));
        assert_eq!(
            require_role(&approver, &Role::APPLICANT),
            Err(AuthzError::Forbidden(Role::APPLICANT))
        );
    }
}
