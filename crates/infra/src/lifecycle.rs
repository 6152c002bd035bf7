//! Application lifecycle engine.
//!
//! Owns every write to `DefaultApplication::status` and `Customer::is_default`.
//! Each operation runs in one unit of work: multi-entity transitions either
//! commit both writes or neither. Submissions and the transitions that move
//! `is_default` hold the customer row until they finish.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use defaultdesk_applications::{ApplicationStatus, DefaultApplication, Severity, SubmitApplication};
use defaultdesk_core::{ApplicationId, ConflictReason, DomainError, Resource, UserId};

use crate::repository::{constraints, ApplicationDetail, RepositoryError, UnitOfWork, UnitOfWorkFactory};
use crate::service::{complete, ServiceError, ServiceResult, StoreResultExt};

/// Command: CreateApplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplication {
    pub customer_name: String,
    pub severity: Severity,
    pub reason: String,
    pub remarks: Option<String>,
    pub applicant_id: UserId,
}

#[derive(Clone)]
pub struct ApplicationLifecycle {
    store: Arc<dyn UnitOfWorkFactory>,
}

impl ApplicationLifecycle {
    pub fn new(store: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { store }
    }

    /// Submit a new `Pending` application against a customer looked up by name.
    ///
    /// Checks, first failure wins: the customer exists; it is not already
    /// defaulted; it has no other pending application.
    pub async fn create_application(&self, cmd: CreateApplication) -> ServiceResult<ApplicationDetail> {
        let mut uow = self.store.begin().await?;
        let result = create_in(&mut *uow, cmd).await;
        complete(uow, result).await
    }

    /// `Pending → Approved`; flags the customer as defaulted.
    pub async fn approve_application(
        &self,
        id: ApplicationId,
        approver_id: UserId,
    ) -> ServiceResult<DefaultApplication> {
        let mut uow = self.store.begin().await?;
        let result = approve_in(&mut *uow, id, approver_id).await;
        complete(uow, result).await
    }

    /// `Pending → Rejected`. The customer is untouched.
    pub async fn reject_application(
        &self,
        id: ApplicationId,
        approver_id: UserId,
        reason: String,
    ) -> ServiceResult<DefaultApplication> {
        let mut uow = self.store.begin().await?;
        let result = reject_in(&mut *uow, id, approver_id, reason).await;
        complete(uow, result).await
    }

    /// `Approved → RebirthPending`.
    pub async fn apply_for_rebirth(
        &self,
        id: ApplicationId,
        applicant_id: UserId,
        rebirth_reason: String,
    ) -> ServiceResult<DefaultApplication> {
        let mut uow = self.store.begin().await?;
        let result = apply_rebirth_in(&mut *uow, id, applicant_id, rebirth_reason).await;
        complete(uow, result).await
    }

    /// `RebirthPending → Reborn`; clears the customer's default flag.
    pub async fn approve_rebirth(
        &self,
        id: ApplicationId,
        approver_id: UserId,
    ) -> ServiceResult<DefaultApplication> {
        let mut uow = self.store.begin().await?;
        let result = approve_rebirth_in(&mut *uow, id, approver_id).await;
        complete(uow, result).await
    }

    /// All applications awaiting review, oldest first, with display data resolved.
    pub async fn pending_applications(&self) -> ServiceResult<Vec<ApplicationDetail>> {
        let mut uow = self.store.begin().await?;
        let result = pending_in(&mut *uow).await;
        complete(uow, result).await
    }
}

async fn create_in(uow: &mut dyn UnitOfWork, cmd: CreateApplication) -> ServiceResult<ApplicationDetail> {
    let customer = uow
        .customers()
        .get_by_name_for_update(cmd.customer_name.trim())
        .await
        .or_not_found(Resource::Customer)?;
    if customer.is_default {
        return Err(DomainError::conflict(ConflictReason::AlreadyDefault).into());
    }
    if uow
        .applications()
        .exists_for_customer(customer.id, ApplicationStatus::Pending)
        .await?
    {
        return Err(DomainError::conflict(ConflictReason::DuplicatePending).into());
    }

    let application = DefaultApplication::submit(SubmitApplication {
        customer_id: customer.id,
        severity: cmd.severity,
        reason: cmd.reason,
        remarks: cmd.remarks,
        applicant_id: cmd.applicant_id,
        submitted_at: Utc::now(),
    })?;

    // A concurrent submission can still win between the check and the insert.
    uow.applications()
        .create(&application)
        .await
        .map_err(|e| match e {
            RepositoryError::UniqueViolation(c) if c == constraints::ONE_PENDING_PER_CUSTOMER => {
                ServiceError::Domain(DomainError::conflict(ConflictReason::DuplicatePending))
            }
            other => ServiceError::Store(other),
        })?;

    info!(
        application_id = %application.id,
        customer_id = %customer.id,
        applicant_id = %application.applicant_id,
        severity = %application.severity,
        "application submitted"
    );
    describe(uow, application).await
}

async fn approve_in(
    uow: &mut dyn UnitOfWork,
    id: ApplicationId,
    approver_id: UserId,
) -> ServiceResult<DefaultApplication> {
    let mut application = uow
        .applications()
        .get_for_update(id)
        .await
        .or_not_found(Resource::Application)?;
    let application_fields = application.approve(approver_id, Utc::now())?;

    let mut customer = uow
        .customers()
        .get_for_update(application.customer_id)
        .await
        .or_not_found(Resource::Customer)?;
    let customer_fields = customer.flag_default();

    uow.customers()
        .update(&customer, customer_fields)
        .await
        .or_not_found(Resource::Customer)?;
    uow.applications()
        .update(&application, application_fields)
        .await
        .or_not_found(Resource::Application)?;

    info!(
        application_id = %application.id,
        customer_id = %customer.id,
        approver_id = %approver_id,
        "application approved; customer flagged as default"
    );
    Ok(application)
}

async fn reject_in(
    uow: &mut dyn UnitOfWork,
    id: ApplicationId,
    approver_id: UserId,
    reason: String,
) -> ServiceResult<DefaultApplication> {
    let mut application = uow
        .applications()
        .get_for_update(id)
        .await
        .or_not_found(Resource::Application)?;
    let fields = application.reject(approver_id, reason, Utc::now())?;

    uow.applications()
        .update(&application, fields)
        .await
        .or_not_found(Resource::Application)?;

    info!(
        application_id = %application.id,
        customer_id = %application.customer_id,
        approver_id = %approver_id,
        "application rejected"
    );
    Ok(application)
}

async fn apply_rebirth_in(
    uow: &mut dyn UnitOfWork,
    id: ApplicationId,
    applicant_id: UserId,
    rebirth_reason: String,
) -> ServiceResult<DefaultApplication> {
    let mut application = uow
        .applications()
        .get_for_update(id)
        .await
        .or_not_found(Resource::Application)?;
    let fields = application.apply_for_rebirth(rebirth_reason)?;

    uow.applications()
        .update(&application, fields)
        .await
        .or_not_found(Resource::Application)?;

    info!(
        application_id = %application.id,
        customer_id = %application.customer_id,
        applicant_id = %applicant_id,
        "rebirth requested"
    );
    Ok(application)
}

async fn approve_rebirth_in(
    uow: &mut dyn UnitOfWork,
    id: ApplicationId,
    approver_id: UserId,
) -> ServiceResult<DefaultApplication> {
    let mut application = uow
        .applications()
        .get_for_update(id)
        .await
        .or_not_found(Resource::Application)?;
    let application_fields = application.approve_rebirth(approver_id, Utc::now())?;

    let mut customer = uow
        .customers()
        .get_for_update(application.customer_id)
        .await
        .or_not_found(Resource::Customer)?;
    let customer_fields = customer.clear_default();

    uow.applications()
        .update(&application, application_fields)
        .await
        .or_not_found(Resource::Application)?;
    uow.customers()
        .update(&customer, customer_fields)
        .await
        .or_not_found(Resource::Customer)?;

    info!(
        application_id = %application.id,
        customer_id = %customer.id,
        approver_id = %approver_id,
        "rebirth approved; customer default flag cleared"
    );
    Ok(application)
}

async fn pending_in(uow: &mut dyn UnitOfWork) -> ServiceResult<Vec<ApplicationDetail>> {
    let pending = uow
        .applications()
        .find_all_by_status(ApplicationStatus::Pending)
        .await?;

    let mut details = Vec::with_capacity(pending.len());
    for application in pending {
        details.push(describe(uow, application).await?);
    }
    Ok(details)
}

async fn describe(uow: &mut dyn UnitOfWork, application: DefaultApplication) -> ServiceResult<ApplicationDetail> {
    let customer = uow
        .customers()
        .get_by_id(application.customer_id)
        .await
        .or_not_found(Resource::Customer)?;

    Ok(ApplicationDetail {
        applicant_name: username_of(uow, Some(application.applicant_id)).await?,
        approver_name: username_of(uow, application.approver_id).await?,
        rebirth_approver_name: username_of(uow, application.rebirth_approver_id).await?,
        customer_name: customer.name,
        latest_ext_grade: customer.latest_ext_grade,
        application,
    })
}

async fn username_of(uow: &mut dyn UnitOfWork, id: Option<UserId>) -> ServiceResult<Option<String>> {
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(uow.users().get_by_id(id).await.optional()?.map(|u| u.username))
}
