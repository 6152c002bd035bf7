//! HS256 token issuing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use defaultdesk_core::UserId;

use crate::{JwtClaims, Role, TokenValidationError, validate_claims};

/// Issuer stamped into (and required from) every token.
pub const TOKEN_ISSUER: &str = "defaultdesk";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or unverifiable token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// A freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Signs a token for an authenticated user.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: UserId, role: &Role, now: DateTime<Utc>) -> Result<IssuedToken, TokenError>;
}

/// Shared-secret HS256 signer/verifier.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    fn validation() -> Validation {
        // Time window lives in `issued_at`/`expires_at` and is checked by `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation
    }
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl TokenIssuer for Hs256Jwt {
    fn issue(&self, user_id: UserId, role: &Role, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let claims = JwtClaims {
            sub: user_id,
            role: role.clone(),
            iss: TOKEN_ISSUER.to_string(),
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str) -> Hs256Jwt {
        Hs256Jwt::new(secret, Duration::hours(24))
    }

    #[test]
    fn issued_token_validates_with_same_secret() {
        let now = Utc::now();
        let user = UserId::new();
        let issued = jwt("s3cret").issue(user, &Role::APPROVER, now).unwrap();

        let claims = jwt("s3cret").validate(&issued.token, now).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.role, Role::APPROVER);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(issued.expires_at, now + Duration::hours(24));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let issued = jwt("one").issue(UserId::new(), &Role::APPLICANT, now).unwrap();
        assert!(matches!(jwt("two").validate(&issued.token, now), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let issued = jwt("s").issue(UserId::new(), &Role::APPLICANT, now).unwrap();
        assert_eq!(
            jwt("s").validate(&issued.token, now + Duration::hours(25)),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: UserId::new(),
            role: Role::APPLICANT,
            iss: "someone-else".to_string(),
            issued_at: now,
            expires_at: now + Duration::minutes(10),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"s"),
        )
        .unwrap();
        assert!(matches!(jwt("s").validate(&token, now), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(jwt("s").validate("not.a.jwt", Utc::now()).is_err());
    }
}
