use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    response::IntoResponse,
    Json,
};

use defaultdesk_core::DomainError;
use defaultdesk_infra::repository::Dimension;

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;

/// `GET /api/v1/statistics/{defaults|rebirths}/{industry|region}?year=&include_historical=`
pub async fn by_dimension(
    Extension(services): Extension<Arc<AppServices>>,
    Path((target, dimension)): Path<(String, String)>,
    query: Result<Query<dto::StatisticsQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query.map_err(errors::query_rejection)?;
    let target = dto::parse_stat_target(&target).map_err(errors::domain_error_to_response)?;
    let dimension: Dimension = dimension.parse().map_err(errors::domain_error_to_response)?;
    let year = query
        .year
        .ok_or_else(|| errors::domain_error_to_response(DomainError::validation("query parameter 'year' is required")))?;

    let report = services
        .statistics
        .statistics(year, dimension, target, query.include_historical.unwrap_or(false))
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(Json(report).into_response())
}
