//! Registered user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use defaultdesk_core::{DomainError, DomainResult, UserId};

use crate::Role;

pub const MIN_USERNAME_LEN: usize = 4;
pub const MAX_USERNAME_LEN: usize = 64;
pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered user.
///
/// # Invariants
/// - `username` is unique (enforced by the store).
/// - `password_hash` is never the plaintext password.
/// - `role` is fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Command: RegisterUser. The password has already been hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub occurred_at: DateTime<Utc>,
}

impl User {
    pub fn register(cmd: RegisterUser) -> DomainResult<Self> {
        Self::validate_username(&cmd.username)?;
        if Role::parse_known(cmd.role.as_str()).is_none() {
            return Err(DomainError::validation(format!(
                "role must be one of Applicant, Approver (got '{}')",
                cmd.role
            )));
        }

        Ok(Self {
            id: UserId::new(),
            username: cmd.username,
            password_hash: cmd.password_hash,
            role: cmd.role,
            created_at: cmd.occurred_at,
        })
    }

    pub fn validate_username(username: &str) -> DomainResult<()> {
        let len = username.chars().count();
        if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
            return Err(DomainError::validation(format!(
                "username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
            )));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("username cannot contain whitespace"));
        }
        Ok(())
    }

    pub fn validate_password(password: &str) -> DomainResult<()> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(username: &str, role: Role) -> RegisterUser {
        RegisterUser {
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn registers_known_role() {
        let user = User::register(cmd("alice", Role::APPLICANT)).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::APPLICANT);
    }

    #[test]
    fn rejects_short_username_and_unknown_role() {
        assert!(User::register(cmd("bob", Role::APPROVER)).is_err());
        assert!(User::register(cmd("mallory", Role::new("Admin"))).is_err());
    }

    #[test]
    fn password_length_is_checked_on_plaintext() {
        assert!(User::validate_password("12345").is_err());
        assert!(User::validate_password("123456").is_ok());
    }

    #[test]
    fn hash_is_never_serialized() {
        let user = User::register(cmd("alice", Role::APPLICANT)).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
