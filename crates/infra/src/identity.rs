//! Registration and login.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use defaultdesk_auth::{IssuedToken, PasswordHasher, RegisterUser, Role, TokenIssuer, User};
use defaultdesk_core::{ConflictReason, DomainError};

use crate::repository::{constraints, RepositoryError, UnitOfWorkFactory};
use crate::service::{complete, ServiceError, ServiceResult, StoreResultExt};

/// Command: Register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn UnitOfWorkFactory>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl IdentityService {
    pub fn new(
        store: Arc<dyn UnitOfWorkFactory>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self { store, hasher, tokens }
    }

    /// Create an account. Fails with `Conflict(UsernameTaken)` on a duplicate username.
    pub async fn register(&self, cmd: Register) -> ServiceResult<User> {
        let username = cmd.username.trim().to_string();
        User::validate_username(&username)?;
        User::validate_password(&cmd.password)?;
        let role = Role::parse_known(cmd.role.trim()).ok_or_else(|| {
            DomainError::validation(format!("role must be one of Applicant, Approver (got '{}')", cmd.role))
        })?;

        let password_hash = self.hash(cmd.password).await?;
        let user = User::register(RegisterUser {
            username,
            password_hash,
            role,
            occurred_at: Utc::now(),
        })?;

        let mut uow = self.store.begin().await?;
        let result = uow.users().create(&user).await.map_err(|e| match e {
            RepositoryError::UniqueViolation(c) if c == constraints::USERNAME => {
                ServiceError::Domain(DomainError::conflict(ConflictReason::UsernameTaken))
            }
            other => ServiceError::Store(other),
        });
        complete(uow, result).await?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable (`Unauthorized`).
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<(User, IssuedToken)> {
        let mut uow = self.store.begin().await?;
        let result = uow.users().get_by_username(username.trim()).await.optional();
        let user = complete(uow, result).await?.ok_or(DomainError::Unauthorized)?;

        if !self.verify(password.to_string(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(DomainError::Unauthorized.into());
        }

        let token = self
            .tokens
            .issue(user.id, &user.role, Utc::now())
            .map_err(|e| ServiceError::Credentials(e.to_string()))?;
        info!(user_id = %user.id, "user logged in");
        Ok((user, token))
    }

    async fn hash(&self, password: String) -> ServiceResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::Credentials(e.to_string()))?
            .map_err(|e| ServiceError::Credentials(e.to_string()))
    }

    async fn verify(&self, password: String, hash: String) -> ServiceResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| ServiceError::Credentials(e.to_string()))?
            .map_err(|e| ServiceError::Credentials(e.to_string()))
    }
}
