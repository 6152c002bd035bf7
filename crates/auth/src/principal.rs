use serde::{Deserialize, Serialize};

use defaultdesk_core::UserId;

use crate::{JwtClaims, Role};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

impl From<JwtClaims> for Principal {
    fn from(claims: JwtClaims) -> Self {
        Self::new(claims.sub, claims.role)
    }
}
