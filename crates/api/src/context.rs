use defaultdesk_auth::{JwtClaims, Principal, Role};
use defaultdesk_core::UserId;

/// Principal context for a request (authenticated user + role).
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            principal: Principal::new(user_id, role),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn role(&self) -> &Role {
        &self.principal.role
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

impl From<JwtClaims> for PrincipalContext {
    fn from(claims: JwtClaims) -> Self {
        Self {
            principal: claims.into(),
        }
    }
}
