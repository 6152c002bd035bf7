//! `defaultdesk-auth`: authentication/authorization boundary.
//!
//! Identity records, role checks, token issuing/verification and password
//! hashing. This crate is decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, require_role};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, IssuedToken, JwtValidator, TOKEN_ISSUER, TokenError, TokenIssuer};
pub use password::{Argon2PasswordHasher, PasswordError, PasswordHasher};
pub use principal::Principal;
pub use roles::Role;
pub use user::{RegisterUser, User};
