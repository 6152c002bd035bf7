use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use defaultdesk_auth::Role;
use defaultdesk_infra::customers::AddCustomer;

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateCustomerRequest>, JsonRejection>,
) -> ApiResult {
    authz::require(&principal, &Role::APPROVER)?;
    let Json(body) = body.map_err(errors::json_rejection)?;

    let customer = services
        .customers
        .add(AddCustomer {
            name: body.name,
            industry: body.industry,
            region: body.region,
            latest_ext_grade: body.latest_ext_grade,
        })
        .await
        .map_err(errors::service_error_to_response)?;

    Ok((StatusCode::CREATED, Json(customer)).into_response())
}

pub async fn list_customers(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    let items = services
        .customers
        .list()
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(Json(serde_json::json!({ "items": items })).into_response())
}
