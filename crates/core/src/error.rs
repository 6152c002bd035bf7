//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// The kind of entity a `NotFound` refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Customer,
    Application,
    User,
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Resource::Customer => "customer",
            Resource::Application => "application",
            Resource::User => "user",
        })
    }
}

/// Structured reason for a `Conflict` (a violated precondition).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// The customer is already flagged as defaulted.
    AlreadyDefault,
    /// The customer already has an application awaiting review.
    DuplicatePending,
    /// The application is not in `Pending`.
    NotPending,
    /// The application is not in `Approved`.
    NotApproved,
    /// The application is not in `RebirthPending`.
    NotRebirthPending,
    /// The username is already registered.
    UsernameTaken,
    /// A customer with the same name already exists.
    CustomerNameTaken,
}

impl ConflictReason {
    /// Stable machine-readable code (used in error bodies).
    pub fn code(&self) -> &'static str {
        match self {
            ConflictReason::AlreadyDefault => "already_default",
            ConflictReason::DuplicatePending => "duplicate_pending",
            ConflictReason::NotPending => "not_pending",
            ConflictReason::NotApproved => "not_approved",
            ConflictReason::NotRebirthPending => "not_rebirth_pending",
            ConflictReason::UsernameTaken => "username_taken",
            ConflictReason::CustomerNameTaken => "customer_name_taken",
        }
    }
}

impl core::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ConflictReason::AlreadyDefault => "customer is already in default status",
            ConflictReason::DuplicatePending => {
                "there is already a pending application for this customer"
            }
            ConflictReason::NotPending => "application is not in pending state",
            ConflictReason::NotApproved => "only approved applications can apply for rebirth",
            ConflictReason::NotRebirthPending => {
                "application is not pending for rebirth approval"
            }
            ConflictReason::UsernameTaken => "username already exists",
            ConflictReason::CustomerNameTaken => "customer name already exists",
        })
    }
}

/// Coarse error category, used by boundary layers to pick a response code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Unauthorized,
    Internal,
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// preconditions, conflicts). Storage failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(Resource),

    /// A precondition was violated.
    #[error("{0}")]
    Conflict(ConflictReason),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Credentials or token were rejected.
    #[error("invalid username or password")]
    Unauthorized,
}

impl DomainError {
    pub fn not_found(resource: Resource) -> Self {
        Self::NotFound(resource)
    }

    pub fn conflict(reason: ConflictReason) -> Self {
        Self::Conflict(reason)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::Unauthorized => ErrorKind::Unauthorized,
        }
    }

    /// The conflict reason, if this is a `Conflict`.
    pub fn conflict_reason(&self) -> Option<ConflictReason> {
        match self {
            DomainError::Conflict(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            DomainError::not_found(Resource::Customer).to_string(),
            "customer not found"
        );
        assert_eq!(
            DomainError::conflict(ConflictReason::NotPending).to_string(),
            "application is not in pending state"
        );
    }

    #[test]
    fn kind_follows_variant() {
        assert_eq!(DomainError::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            DomainError::conflict(ConflictReason::AlreadyDefault).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            DomainError::conflict(ConflictReason::DuplicatePending).conflict_reason(),
            Some(ConflictReason::DuplicatePending)
        );
        assert_eq!(DomainError::validation("x").conflict_reason(), None);
    }
}
