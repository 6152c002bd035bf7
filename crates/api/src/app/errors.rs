use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

use defaultdesk_auth::AuthzError;
use defaultdesk_core::DomainError;
use defaultdesk_infra::ServiceError;

/// Handler result: both arms are complete responses.
pub type ApiResult = Result<Response, Response>;

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => {
            warn!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
        }
        ServiceError::Credentials(msg) => {
            warn!(error = %msg, "credential processing failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    let message = err.to_string();
    match err {
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(reason) => json_error(StatusCode::CONFLICT, reason.code(), message),
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", message),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn json_rejection(err: JsonRejection) -> Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", err.body_text())
}

pub fn query_rejection(err: QueryRejection) -> Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", err.body_text())
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use defaultdesk_core::{ConflictReason, Resource};
    use defaultdesk_infra::repository::RepositoryError;

    #[test]
    fn kinds_map_to_status_codes() {
        let cases = [
            (DomainError::not_found(Resource::Customer), StatusCode::NOT_FOUND),
            (DomainError::conflict(ConflictReason::NotPending), StatusCode::CONFLICT),
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }

        let store = ServiceError::Store(RepositoryError::Storage("down".to_string()));
        assert_eq!(
            service_error_to_response(store).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let forbidden = AuthzError::Forbidden(defaultdesk_auth::Role::APPROVER);
        assert_eq!(authz_error_to_response(forbidden).status(), StatusCode::FORBIDDEN);
    }
}
