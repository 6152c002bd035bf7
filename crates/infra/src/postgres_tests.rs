//! Lifecycle tests against a real Postgres.
//!
//! Skipped unless `TEST_DATABASE_URL` points at a database the tests may write
//! to. Every run seeds uniquely named rows, so the database can be reused.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use defaultdesk_applications::{ApplicationStatus, Severity};
use defaultdesk_auth::{Role, User};
use defaultdesk_core::{ConflictReason, CustomerId, DomainError, UserId};
use defaultdesk_customers::{Customer, CustomerField, RegisterCustomer};

use crate::db;
use crate::lifecycle::{ApplicationLifecycle, CreateApplication};
use crate::repository::{
    ApplicationFilter, ApplicationRepository, CustomerRepository, Pagination, PostgresStore, RepositoryError,
    UnitOfWork, UnitOfWorkFactory, UserRepository,
};

async fn store() -> Option<PostgresStore> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = db::connect(&url, 5).await.unwrap();
    db::migrate(&pool).await.unwrap();
    Some(PostgresStore::new(pool))
}

async fn seed_user(store: &PostgresStore, role: Role) -> UserId {
    let id = UserId::new();
    let user = User {
        id,
        username: format!("user-{id}"),
        password_hash: "$argon2id$not-a-real-hash".to_string(),
        role,
        created_at: Utc::now(),
    };
    let mut uow = store.begin().await.unwrap();
    uow.users().create(&user).await.unwrap();
    uow.commit().await.unwrap();
    id
}

async fn seed_customer(store: &PostgresStore) -> Customer {
    let customer = Customer::register(RegisterCustomer {
        name: format!("Acme {}", CustomerId::new()),
        industry: "Manufacturing".to_string(),
        region: "East".to_string(),
        latest_ext_grade: None,
        occurred_at: Utc::now(),
    })
    .unwrap();
    let mut uow = store.begin().await.unwrap();
    uow.customers().create(&customer).await.unwrap();
    uow.commit().await.unwrap();
    customer
}

fn submit(customer_name: &str, applicant_id: UserId) -> CreateApplication {
    CreateApplication {
        customer_name: customer_name.to_string(),
        severity: Severity::High,
        reason: "Overdue more than 90 days".to_string(),
        remarks: None,
        applicant_id,
    }
}

/// Store that parks a submission right after it has read the customer.
#[derive(Clone)]
struct GatedStore {
    inner: PostgresStore,
    reached: Arc<Notify>,
    resume: Arc<Notify>,
}

#[async_trait]
impl UnitOfWorkFactory for GatedStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        Ok(Box::new(GatedUnitOfWork {
            inner: self.inner.begin().await?,
            gate: self.clone(),
        }))
    }
}

struct GatedUnitOfWork {
    inner: Box<dyn UnitOfWork>,
    gate: GatedStore,
}

#[async_trait]
impl UnitOfWork for GatedUnitOfWork {
    fn customers(&mut self) -> Box<dyn CustomerRepository + '_> {
        let gate = self.gate.clone();
        Box::new(GatedCustomers {
            inner: self.inner.customers(),
            gate,
        })
    }

    fn applications(&mut self) -> Box<dyn ApplicationRepository + '_> {
        self.inner.applications()
    }

    fn users(&mut self) -> Box<dyn UserRepository + '_> {
        self.inner.users()
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.rollback().await
    }
}

struct GatedCustomers<'a> {
    inner: Box<dyn CustomerRepository + 'a>,
    gate: GatedStore,
}

#[async_trait]
impl CustomerRepository for GatedCustomers<'_> {
    async fn create(&mut self, customer: &Customer) -> Result<(), RepositoryError> {
        self.inner.create(customer).await
    }

    async fn get_by_id(&mut self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.inner.get_by_id(id).await
    }

    async fn get_by_name(&mut self, name: &str) -> Result<Customer, RepositoryError> {
        self.inner.get_by_name(name).await
    }

    async fn get_for_update(&mut self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.inner.get_for_update(id).await
    }

    async fn get_by_name_for_update(&mut self, name: &str) -> Result<Customer, RepositoryError> {
        let customer = self.inner.get_by_name_for_update(name).await?;
        self.gate.reached.notify_one();
        self.gate.resume.notified().await;
        Ok(customer)
    }

    async fn update(&mut self, customer: &Customer, fields: &[CustomerField]) -> Result<(), RepositoryError> {
        self.inner.update(customer, fields).await
    }

    async fn list(&mut self) -> Result<Vec<Customer>, RepositoryError> {
        self.inner.list().await
    }
}

#[tokio::test]
async fn approval_waits_for_an_in_flight_submission_on_the_same_customer() {
    let Some(store) = store().await else {
        return;
    };
    let alice = seed_user(&store, Role::APPLICANT).await;
    let bob = seed_user(&store, Role::APPROVER).await;
    let acme = seed_customer(&store).await;

    let lifecycle = ApplicationLifecycle::new(Arc::new(store.clone()));
    let first = lifecycle
        .create_application(submit(&acme.name, alice))
        .await
        .unwrap()
        .application
        .id;

    let gated = GatedStore {
        inner: store.clone(),
        reached: Arc::new(Notify::new()),
        resume: Arc::new(Notify::new()),
    };
    let racing = {
        let lifecycle = ApplicationLifecycle::new(Arc::new(gated.clone()));
        let cmd = submit(&acme.name, alice);
        tokio::spawn(async move { lifecycle.create_application(cmd).await })
    };
    gated.reached.notified().await;

    let approval = {
        let lifecycle = lifecycle.clone();
        tokio::spawn(async move { lifecycle.approve_application(first, bob).await })
    };
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!approval.is_finished(), "approval must wait for the customer row");

    gated.resume.notify_one();
    let err = racing.await.unwrap().unwrap_err();
    assert_eq!(
        err.domain().and_then(DomainError::conflict_reason),
        Some(ConflictReason::DuplicatePending)
    );
    let approved = approval.await.unwrap().unwrap();
    assert_eq!(approved.status, ApplicationStatus::Approved);

    let err = lifecycle
        .create_application(submit(&acme.name, alice))
        .await
        .unwrap_err();
    assert_eq!(
        err.domain().and_then(DomainError::conflict_reason),
        Some(ConflictReason::AlreadyDefault)
    );

    let mut uow = store.begin().await.unwrap();
    let customer = uow.customers().get_by_id(acme.id).await.unwrap();
    let approved = uow
        .applications()
        .find_all(
            &ApplicationFilter {
                customer_name: Some(acme.name.clone()),
                status: Some(ApplicationStatus::Approved),
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    uow.rollback().await.unwrap();
    assert!(customer.is_default);
    assert_eq!(approved.total, 1);
}
