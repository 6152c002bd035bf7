use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use defaultdesk_core::UserId;

use crate::Role;

/// JWT claims model (transport-agnostic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// The role granted at registration.
    pub role: Role,

    /// Token issuer.
    pub iss: String,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of JWT claims.
///
/// Signature verification happens in [`crate::jwt`]; this only checks claims.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_at: DateTime<Utc>, ttl: Duration) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            role: Role::APPLICANT,
            iss: "test".to_string(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn window_checks() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims(now, Duration::hours(1)), now), Ok(()));
        assert_eq!(
            validate_claims(&claims(now, Duration::hours(1)), now + Duration::hours(2)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims(now + Duration::minutes(5), Duration::hours(1)), now),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims(now, Duration::zero()), now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
