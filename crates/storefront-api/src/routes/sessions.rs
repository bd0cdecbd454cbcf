//! Login and logout.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use storefront_enduser::application::command_handlers;
use storefront_enduser::application::session_reconciliation::ReconciledSessions;
use storefront_enduser::domain::commands::{LoginByEmail, Logout};
use storefront_enduser::domain::session::SESSION_ACCOUNT_LIFETIME;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{ApiError, ResultBody};
use crate::middleware::logged_in;
use crate::routes::login_cookies;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Registered email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    Extension(sessions): Extension<ReconciledSessions>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let guest_cart_session_id = sessions.guest_cart_session_id();
    let command = LoginByEmail {
        correlation_id: Uuid::new_v4(),
        email: request.email,
        password: request.password,
        guest_cart_session_id: guest_cart_session_id.clone(),
    };

    info!(correlation_id = %command.correlation_id, "handling login_by_email command");

    let logged_in = command_handlers::handle_login_by_email(&command, &state.services).await?;
    let cookies = login_cookies(
        &state,
        &logged_in,
        guest_cart_session_id.as_ref(),
        state.services.clock.now(),
    )
    .await?;

    Ok((cookies, Json(ResultBody::success())).into_response())
}

/// DELETE /sessions
#[instrument(skip_all)]
async fn logout(
    State(state): State<AppState>,
    Extension(sessions): Extension<ReconciledSessions>,
) -> Result<Response, ApiError> {
    let session = logged_in(&sessions)?;
    let command = Logout {
        correlation_id: Uuid::new_v4(),
        session_id: session.session_id.clone(),
    };

    info!(
        correlation_id = %command.correlation_id,
        account_id = %session.account_id,
        "handling logout command"
    );

    command_handlers::handle_logout(&command, &state.services).await?;

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        state
            .cookies
            .removal_cookie(SESSION_ACCOUNT_LIFETIME.cookie_name)?,
    );
    Ok((headers, Json(ResultBody::success())).into_response())
}

/// Returns the public router for session endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(login))
}

/// Returns the session endpoints that require a login.
pub fn private_router() -> Router<AppState> {
    Router::new().route("/sessions", delete(logout))
}
