use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use tokio::sync::{Mutex, OwnedMutexGuard};

use defaultdesk_applications::{ApplicationField, ApplicationStatus, DefaultApplication};
use defaultdesk_auth::User;
use defaultdesk_core::{ApplicationId, CustomerId, UserId};
use defaultdesk_customers::{Customer, CustomerField};

use super::{
    constraints, ApplicationDetail, ApplicationFilter, ApplicationRepository, CustomerRepository, Dimension,
    DimensionCount, Page, Pagination, RepositoryError, StatTarget, UnitOfWork, UnitOfWorkFactory, UserRepository,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: HashMap<CustomerId, Customer>,
    applications: HashMap<ApplicationId, DefaultApplication>,
    users: HashMap<UserId, User>,
}

impl Tables {
    fn detail(&self, application: &DefaultApplication) -> ApplicationDetail {
        let username = |id: Option<UserId>| {
            id.and_then(|id| self.users.get(&id))
                .map(|u| u.username.clone())
        };
        let customer = self.customers.get(&application.customer_id);
        ApplicationDetail {
            application: application.clone(),
            customer_name: customer.map(|c| c.name.clone()).unwrap_or_default(),
            latest_ext_grade: customer.and_then(|c| c.latest_ext_grade.clone()),
            applicant_name: username(Some(application.applicant_id)),
            approver_name: username(application.approver_id),
            rebirth_approver_name: username(application.rebirth_approver_id),
        }
    }
}

/// In-memory store.
///
/// Intended for tests/dev. Units of work are serialized: `begin` waits for the
/// previous one to finish, then works on a private copy of the tables that
/// `commit` publishes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryUnitOfWork { guard, working }))
    }
}

struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn customers(&mut self) -> Box<dyn CustomerRepository + '_> {
        Box::new(Customers(&mut self.working))
    }

    fn applications(&mut self) -> Box<dyn ApplicationRepository + '_> {
        Box::new(Applications(&mut self.working))
    }

    fn users(&mut self) -> Box<dyn UserRepository + '_> {
        Box::new(Users(&mut self.working))
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        Ok(())
    }
}

struct Customers<'t>(&'t mut Tables);

#[async_trait]
impl CustomerRepository for Customers<'_> {
    async fn create(&mut self, customer: &Customer) -> Result<(), RepositoryError> {
        if self.0.customers.values().any(|c| c.name == customer.name) {
            return Err(RepositoryError::UniqueViolation(constraints::CUSTOMER_NAME.to_string()));
        }
        self.0.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn get_by_id(&mut self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.0.customers.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn get_by_name(&mut self, name: &str) -> Result<Customer, RepositoryError> {
        self.0
            .customers
            .values()
            .find(|c| c.name == name)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_for_update(&mut self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.get_by_id(id).await
    }

    async fn get_by_name_for_update(&mut self, name: &str) -> Result<Customer, RepositoryError> {
        self.get_by_name(name).await
    }

    async fn update(&mut self, customer: &Customer, fields: &[CustomerField]) -> Result<(), RepositoryError> {
        let stored = self.0.customers.get_mut(&customer.id).ok_or(RepositoryError::NotFound)?;
        for field in fields {
            match field {
                CustomerField::IsDefault => stored.is_default = customer.is_default,
                CustomerField::LatestExtGrade => stored.latest_ext_grade = customer.latest_ext_grade.clone(),
            }
        }
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<Customer>, RepositoryError> {
        let mut all: Vec<Customer> = self.0.customers.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

struct Applications<'t>(&'t mut Tables);

#[async_trait]
impl ApplicationRepository for Applications<'_> {
    async fn create(&mut self, application: &DefaultApplication) -> Result<(), RepositoryError> {
        let pending_exists = application.status == ApplicationStatus::Pending
            && self.0.applications.values().any(|a| {
                a.customer_id == application.customer_id && a.status == ApplicationStatus::Pending
            });
        if pending_exists {
            return Err(RepositoryError::UniqueViolation(
                constraints::ONE_PENDING_PER_CUSTOMER.to_string(),
            ));
        }
        self.0.applications.insert(application.id, application.clone());
        Ok(())
    }

    async fn get_by_id(&mut self, id: ApplicationId) -> Result<DefaultApplication, RepositoryError> {
        self.0.applications.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn get_for_update(&mut self, id: ApplicationId) -> Result<DefaultApplication, RepositoryError> {
        // The whole unit of work is already exclusive.
        self.get_by_id(id).await
    }

    async fn update(
        &mut self,
        application: &DefaultApplication,
        fields: &[ApplicationField],
    ) -> Result<(), RepositoryError> {
        let stored = self
            .0
            .applications
            .get_mut(&application.id)
            .ok_or(RepositoryError::NotFound)?;
        for field in fields {
            match field {
                ApplicationField::Status => stored.status = application.status,
                ApplicationField::ApproverId => stored.approver_id = application.approver_id,
                ApplicationField::ApprovalTime => stored.approval_time = application.approval_time,
                ApplicationField::RejectionReason => {
                    stored.rejection_reason = application.rejection_reason.clone()
                }
                ApplicationField::RebirthReason => stored.rebirth_reason = application.rebirth_reason.clone(),
                ApplicationField::RebirthApproverId => {
                    stored.rebirth_approver_id = application.rebirth_approver_id
                }
                ApplicationField::RebirthApprovalTime => {
                    stored.rebirth_approval_time = application.rebirth_approval_time
                }
            }
        }
        Ok(())
    }

    async fn find_all_by_status(
        &mut self,
        status: ApplicationStatus,
    ) -> Result<Vec<DefaultApplication>, RepositoryError> {
        let mut found: Vec<DefaultApplication> = self
            .0
            .applications
            .values()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.application_time.cmp(&b.application_time).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn exists_for_customer(
        &mut self,
        customer_id: CustomerId,
        status: ApplicationStatus,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .0
            .applications
            .values()
            .any(|a| a.customer_id == customer_id && a.status == status))
    }

    async fn find_all(
        &mut self,
        filter: &ApplicationFilter,
        pagination: Pagination,
    ) -> Result<Page<ApplicationDetail>, RepositoryError> {
        let tables = &*self.0;
        let mut matching: Vec<&DefaultApplication> = tables
            .applications
            .values()
            .filter(|a| {
                let name = tables
                    .customers
                    .get(&a.customer_id)
                    .map(|c| c.name.as_str())
                    .unwrap_or_default();
                filter.matches(a, name)
            })
            .collect();
        matching.sort_by(|a, b| b.application_time.cmp(&a.application_time).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .map(|a| tables.detail(a))
            .collect();

        Ok(Page {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        })
    }

    async fn count_by_dimension(
        &mut self,
        dimension: Dimension,
        target: StatTarget,
        year: i32,
    ) -> Result<Vec<DimensionCount>, RepositoryError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for application in self.0.applications.values() {
            if application.status != target.status() {
                continue;
            }
            let Some(at) = target.timestamp_of(application) else {
                continue;
            };
            if at.year() != year {
                continue;
            }
            let Some(customer) = self.0.customers.get(&application.customer_id) else {
                continue;
            };
            let key = match dimension {
                Dimension::Industry => &customer.industry,
                Dimension::Region => &customer.region,
            };
            *counts.entry(key.clone()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(key, count)| DimensionCount { key, count })
            .collect())
    }
}

struct Users<'t>(&'t mut Tables);

#[async_trait]
impl UserRepository for Users<'_> {
    async fn create(&mut self, user: &User) -> Result<(), RepositoryError> {
        if self.0.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::UniqueViolation(constraints::USERNAME.to_string()));
        }
        self.0.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_by_id(&mut self, id: UserId) -> Result<User, RepositoryError> {
        self.0.users.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn get_by_username(&mut self, username: &str) -> Result<User, RepositoryError> {
        self.0
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use defaultdesk_customers::RegisterCustomer;

    fn customer(name: &str) -> Customer {
        Customer::register(RegisterCustomer {
            name: name.to_string(),
            industry: "Retail".to_string(),
            region: "North".to_string(),
            latest_ext_grade: None,
            occurred_at: Utc::now(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() {
        let store = InMemoryStore::new();
        let acme = customer("Acme");

        let mut uow = store.begin().await.unwrap();
        uow.customers().create(&acme).await.unwrap();
        drop(uow);

        let mut uow = store.begin().await.unwrap();
        assert_eq!(uow.customers().get_by_id(acme.id).await, Err(RepositoryError::NotFound));
        uow.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn committed_writes_are_visible_to_the_next_unit() {
        let store = InMemoryStore::new();
        let acme = customer("Acme");

        let mut uow = store.begin().await.unwrap();
        uow.customers().create(&acme).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert_eq!(uow.customers().get_by_name("Acme").await.unwrap().id, acme.id);
        let err = uow.customers().create(&customer("Acme")).await.unwrap_err();
        assert_eq!(err, RepositoryError::UniqueViolation(constraints::CUSTOMER_NAME.to_string()));
    }

    #[tokio::test]
    async fn partial_update_writes_only_listed_fields() {
        let store = InMemoryStore::new();
        let mut acme = customer("Acme");

        let mut uow = store.begin().await.unwrap();
        uow.customers().create(&acme).await.unwrap();

        acme.is_default = true;
        acme.latest_ext_grade = Some("BBB".to_string());
        uow.customers().update(&acme, &[CustomerField::IsDefault]).await.unwrap();

        let stored = uow.customers().get_by_id(acme.id).await.unwrap();
        assert!(stored.is_default);
        assert_eq!(stored.latest_ext_grade, None);
    }
}
