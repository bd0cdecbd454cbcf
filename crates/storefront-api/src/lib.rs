//! Storefront API: axum HTTP surface of the end-user context.

pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;

use crate::state::AppState;

/// Builds the application router. The session middleware wraps every
/// route; routes under `/api/v1/private` additionally require a login.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/accounts", routes::accounts::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .nest(
            "/api/v1/private",
            routes::private_router()
                .route_layer(axum::middleware::from_fn(middleware::require_login)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::reconcile_sessions,
        ))
        .with_state(state)
}
