//! API-side role guard.
//!
//! Handlers call this before invoking a service, keeping the services
//! themselves role-agnostic.

use axum::response::Response;

use defaultdesk_auth::{require_role, Role};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Reject the request with 403 unless the caller holds `role`.
pub fn require(principal: &PrincipalContext, role: &Role) -> Result<(), Response> {
    require_role(principal.principal(), role).map_err(errors::authz_error_to_response)
}
