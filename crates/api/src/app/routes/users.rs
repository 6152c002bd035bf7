use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use defaultdesk_infra::identity::Register;

use crate::app::dto::{self, LoginResponse, ProfileResponse, UserResponse};
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body.map_err(errors::json_rejection)?;

    let user = services
        .identity
        .register(Register {
            username: body.username,
            password: body.password,
            role: body.role,
        })
        .await
        .map_err(errors::service_error_to_response)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body.map_err(errors::json_rejection)?;

    let (_user, token) = services
        .identity
        .login(&body.username, &body.password)
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(Json(LoginResponse {
        token: token.token,
        expires_at: token.expires_at,
    })
    .into_response())
}

pub async fn profile(Extension(principal): Extension<PrincipalContext>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user_id: principal.user_id().to_string(),
        role: principal.role().as_str().to_string(),
    })
}
