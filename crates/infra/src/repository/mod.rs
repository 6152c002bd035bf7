//! Store boundary.
//!
//! Every read and write happens through a [`UnitOfWork`] handed out by a
//! [`UnitOfWorkFactory`]. Repositories are borrowed from the unit of work, so
//! everything they touch commits or rolls back together.
//!
//! ## Error Mapping
//!
//! | Situation | `RepositoryError` |
//! |-----------|-------------------|
//! | Row does not exist | `NotFound` |
//! | Unique constraint hit (`23505` in Postgres) | `UniqueViolation(constraint)` |
//! | Anything else (connection, decode, pool) | `Storage` |

use async_trait::async_trait;
use thiserror::Error;

use defaultdesk_applications::{ApplicationField, ApplicationStatus, DefaultApplication};
use defaultdesk_auth::User;
use defaultdesk_core::{ApplicationId, CustomerId, UserId};
use defaultdesk_customers::{Customer, CustomerField};

pub mod in_memory;
pub mod postgres;
pub mod query;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{
    ApplicationDetail, ApplicationFilter, Dimension, DimensionCount, Page, Pagination, StatTarget,
};

/// Unique constraint names shared by both stores.
pub mod constraints {
    pub const USERNAME: &str = "users_username_key";
    pub const CUSTOMER_NAME: &str = "customers_name_key";
    pub const ONE_PENDING_PER_CUSTOMER: &str = "default_applications_one_pending";
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait CustomerRepository: Send {
    async fn create(&mut self, customer: &Customer) -> Result<(), RepositoryError>;

    async fn get_by_id(&mut self, id: CustomerId) -> Result<Customer, RepositoryError>;

    async fn get_by_name(&mut self, name: &str) -> Result<Customer, RepositoryError>;

    /// Like `get_by_id`, but holds the row until the unit of work ends.
    async fn get_for_update(&mut self, id: CustomerId) -> Result<Customer, RepositoryError>;

    /// Like `get_by_name`, but holds the row until the unit of work ends.
    async fn get_by_name_for_update(&mut self, name: &str) -> Result<Customer, RepositoryError>;

    /// Persist only the listed fields of `customer`.
    async fn update(&mut self, customer: &Customer, fields: &[CustomerField]) -> Result<(), RepositoryError>;

    /// All customers, ordered by name.
    async fn list(&mut self) -> Result<Vec<Customer>, RepositoryError>;
}

#[async_trait]
pub trait ApplicationRepository: Send {
    /// Fails with `UniqueViolation` if the customer already has a `Pending` application.
    async fn create(&mut self, application: &DefaultApplication) -> Result<(), RepositoryError>;

    async fn get_by_id(&mut self, id: ApplicationId) -> Result<DefaultApplication, RepositoryError>;

    /// Like `get_by_id`, but holds the row until the unit of work ends.
    async fn get_for_update(&mut self, id: ApplicationId) -> Result<DefaultApplication, RepositoryError>;

    /// Persist only the listed fields of `application`.
    async fn update(
        &mut self,
        application: &DefaultApplication,
        fields: &[ApplicationField],
    ) -> Result<(), RepositoryError>;

    /// Applications in `status`, oldest submission first.
    async fn find_all_by_status(
        &mut self,
        status: ApplicationStatus,
    ) -> Result<Vec<DefaultApplication>, RepositoryError>;

    async fn exists_for_customer(
        &mut self,
        customer_id: CustomerId,
        status: ApplicationStatus,
    ) -> Result<bool, RepositoryError>;

    /// Filtered, paginated listing joined with customer and user display data.
    async fn find_all(
        &mut self,
        filter: &ApplicationFilter,
        pagination: Pagination,
    ) -> Result<Page<ApplicationDetail>, RepositoryError>;

    /// Per-dimension counts of applications whose current status is `target`
    /// and whose target timestamp falls in `year` (UTC).
    async fn count_by_dimension(
        &mut self,
        dimension: Dimension,
        target: StatTarget,
        year: i32,
    ) -> Result<Vec<DimensionCount>, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send {
    /// Fails with `UniqueViolation` if the username is taken.
    async fn create(&mut self, user: &User) -> Result<(), RepositoryError>;

    async fn get_by_id(&mut self, id: UserId) -> Result<User, RepositoryError>;

    async fn get_by_username(&mut self, username: &str) -> Result<User, RepositoryError>;
}

/// One store transaction.
///
/// Dropping a unit of work without calling `commit` discards its writes.
#[async_trait]
pub trait UnitOfWork: Send {
    fn customers(&mut self) -> Box<dyn CustomerRepository + '_>;

    fn applications(&mut self) -> Box<dyn ApplicationRepository + '_>;

    fn users(&mut self) -> Box<dyn UserRepository + '_>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError>;
}

#[async_trait]
impl<F> UnitOfWorkFactory for std::sync::Arc<F>
where
    F: UnitOfWorkFactory + ?Sized,
{
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        (**self).begin().await
    }
}
