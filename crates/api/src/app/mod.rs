//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the transactional services built over one store handle
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use defaultdesk_auth::Hs256Jwt;
use defaultdesk_infra::config::AppConfig;
use defaultdesk_infra::repository::UnitOfWorkFactory;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router over `store` (public entrypoint used by `main.rs`).
pub fn build_app(store: Arc<dyn UnitOfWorkFactory>, config: &AppConfig) -> Router {
    let jwt = Arc::new(Hs256Jwt::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::hours(config.token_ttl_hours),
    ));
    let auth_state = middleware::AuthState { jwt: jwt.clone() };
    let services = Arc::new(services::AppServices::new(store, jwt));

    // Protected routes: require a valid bearer token.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
