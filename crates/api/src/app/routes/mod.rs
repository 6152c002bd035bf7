use axum::{
    routing::{get, post},
    Router,
};

pub mod applications;
pub mod customers;
pub mod statistics;
pub mod system;
pub mod users;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/ping", get(system::ping))
        .route("/health", get(system::health))
        .route("/api/v1/register", post(users::register))
        .route("/api/v1/login", post(users::login))
}

/// Routes behind the auth middleware. Role checks happen in the handlers.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/v1/profile", get(users::profile))
        .route(
            "/api/v1/applications",
            get(applications::find_applications).post(applications::create_application),
        )
        .route("/api/v1/applications/pending", get(applications::pending_applications))
        .route("/api/v1/applications/review/approve", post(applications::approve_application))
        .route("/api/v1/applications/review/reject", post(applications::reject_application))
        .route("/api/v1/applications/rebirth/apply", post(applications::apply_for_rebirth))
        .route("/api/v1/applications/rebirth/approve", post(applications::approve_rebirth))
        .route("/api/v1/statistics/:target/:dimension", get(statistics::by_dimension))
        .route(
            "/api/v1/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
}
