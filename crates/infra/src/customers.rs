//! Customer directory.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use defaultdesk_core::{ConflictReason, DomainError};
use defaultdesk_customers::{Customer, RegisterCustomer};

use crate::repository::{constraints, RepositoryError, UnitOfWorkFactory};
use crate::service::{complete, ServiceError, ServiceResult};

/// Command: AddCustomer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCustomer {
    pub name: String,
    pub industry: String,
    pub region: String,
    pub latest_ext_grade: Option<String>,
}

#[derive(Clone)]
pub struct CustomerDirectory {
    store: Arc<dyn UnitOfWorkFactory>,
}

impl CustomerDirectory {
    pub fn new(store: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { store }
    }

    /// Register a customer. Names are unique.
    pub async fn add(&self, cmd: AddCustomer) -> ServiceResult<Customer> {
        let customer = Customer::register(RegisterCustomer {
            name: cmd.name,
            industry: cmd.industry,
            region: cmd.region,
            latest_ext_grade: cmd.latest_ext_grade,
            occurred_at: Utc::now(),
        })?;

        let mut uow = self.store.begin().await?;
        let result = uow.customers().create(&customer).await.map_err(|e| match e {
            RepositoryError::UniqueViolation(c) if c == constraints::CUSTOMER_NAME => {
                ServiceError::Domain(DomainError::conflict(ConflictReason::CustomerNameTaken))
            }
            other => ServiceError::Store(other),
        });
        complete(uow, result).await?;

        info!(customer_id = %customer.id, industry = %customer.industry, region = %customer.region, "customer registered");
        Ok(customer)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Customer>> {
        let mut uow = self.store.begin().await?;
        let result = uow.customers().list().await.map_err(Into::into);
        complete(uow, result).await
    }
}
