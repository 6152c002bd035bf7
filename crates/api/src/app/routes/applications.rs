use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use defaultdesk_applications::{ApplicationStatus, DefaultApplication, Severity};
use defaultdesk_auth::Role;
use defaultdesk_infra::lifecycle::CreateApplication;
use defaultdesk_infra::repository::{ApplicationFilter, Pagination};

use crate::app::dto::{self, PaginatedApplicationsResponse, TransitionResponse};
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub async fn create_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateApplicationRequest>, JsonRejection>,
) -> ApiResult {
    authz::require(&principal, &Role::APPLICANT)?;
    let Json(body) = body.map_err(errors::json_rejection)?;
    let severity: Severity = body
        .severity
        .trim()
        .parse()
        .map_err(errors::domain_error_to_response)?;

    let detail = services
        .lifecycle
        .create_application(CreateApplication {
            customer_name: body.customer_name,
            severity,
            reason: body.reason,
            remarks: body.remarks,
            applicant_id: principal.user_id(),
        })
        .await
        .map_err(errors::service_error_to_response)?;

    Ok((StatusCode::CREATED, Json(detail)).into_response())
}

pub async fn approve_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::ReviewRequest>, JsonRejection>,
) -> ApiResult {
    authz::require(&principal, &Role::APPROVER)?;
    let Json(body) = body.map_err(errors::json_rejection)?;
    let id = dto::parse_application_id(&body.application_id).map_err(errors::domain_error_to_response)?;

    let application = services
        .lifecycle
        .approve_application(id, principal.user_id())
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(transitioned("application approved", application))
}

pub async fn reject_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::RejectRequest>, JsonRejection>,
) -> ApiResult {
    authz::require(&principal, &Role::APPROVER)?;
    let Json(body) = body.map_err(errors::json_rejection)?;
    let id = dto::parse_application_id(&body.application_id).map_err(errors::domain_error_to_response)?;

    let application = services
        .lifecycle
        .reject_application(id, principal.user_id(), body.rejection_reason)
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(transitioned("application rejected", application))
}

pub async fn apply_for_rebirth(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::ApplyRebirthRequest>, JsonRejection>,
) -> ApiResult {
    authz::require(&principal, &Role::APPLICANT)?;
    let Json(body) = body.map_err(errors::json_rejection)?;
    let id = dto::parse_application_id(&body.application_id).map_err(errors::domain_error_to_response)?;

    let application = services
        .lifecycle
        .apply_for_rebirth(id, principal.user_id(), body.rebirth_reason)
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(transitioned("rebirth requested", application))
}

pub async fn approve_rebirth(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::ReviewRequest>, JsonRejection>,
) -> ApiResult {
    authz::require(&principal, &Role::APPROVER)?;
    let Json(body) = body.map_err(errors::json_rejection)?;
    let id = dto::parse_application_id(&body.application_id).map_err(errors::domain_error_to_response)?;

    let application = services
        .lifecycle
        .approve_rebirth(id, principal.user_id())
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(transitioned("rebirth approved", application))
}

pub async fn pending_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    authz::require(&principal, &Role::APPROVER)?;

    let pending = services
        .lifecycle
        .pending_applications()
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(Json(serde_json::json!({ "data": pending })).into_response())
}

/// Any authenticated caller may search.
pub async fn find_applications(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ApplicationsQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query.map_err(errors::query_rejection)?;

    let status = dto::non_empty(query.status)
        .map(|s| s.parse::<ApplicationStatus>())
        .transpose()
        .map_err(errors::domain_error_to_response)?;
    let filter = ApplicationFilter {
        customer_name: dto::non_empty(query.customer_name),
        status,
    };

    let page = services
        .statistics
        .find_applications(filter, Pagination::new(query.page, query.page_size))
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(Json(PaginatedApplicationsResponse::from(page)).into_response())
}

fn transitioned(message: &'static str, application: DefaultApplication) -> axum::response::Response {
    Json(TransitionResponse { message, application }).into_response()
}
