//! Account registration and email verification.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use storefront_enduser::application::command_handlers;
use storefront_enduser::application::session_reconciliation::ReconciledSessions;
use storefront_enduser::domain::commands::{CreateAccountByEmail, VerifyEmail};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{ApiError, ResultBody};
use crate::routes::login_cookies;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Deserialize)]
pub struct CreateAccountRequest {
    /// Email address to register.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// The password typed a second time.
    pub password_confirmation: String,
}

/// Query string of GET /email/verify.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    /// Token from the verification mail.
    pub token: String,
}

/// POST /
#[instrument(skip_all)]
async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<ResultBody>, ApiError> {
    let command = CreateAccountByEmail {
        correlation_id: Uuid::new_v4(),
        email: request.email,
        password: request.password,
        password_confirmation: request.password_confirmation,
    };

    info!(correlation_id = %command.correlation_id, "handling create_account_by_email command");

    command_handlers::handle_create_account_by_email(&command, &state.services).await?;

    Ok(Json(ResultBody::success()))
}

/// GET /email/verify?token=…
#[instrument(skip_all)]
async fn verify_email(
    State(state): State<AppState>,
    Extension(sessions): Extension<ReconciledSessions>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Response, ApiError> {
    let guest_cart_session_id = sessions.guest_cart_session_id();
    let command = VerifyEmail {
        correlation_id: Uuid::new_v4(),
        token: query.token,
        guest_cart_session_id: guest_cart_session_id.clone(),
    };

    info!(correlation_id = %command.correlation_id, "handling verify_email command");

    let logged_in = command_handlers::handle_verify_email(&command, &state.services).await?;
    let cookies = login_cookies(
        &state,
        &logged_in,
        guest_cart_session_id.as_ref(),
        state.services.clock.now(),
    )
    .await?;

    Ok((cookies, Json(ResultBody::success())).into_response())
}

/// Returns the router for account endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_account))
        .route("/email/verify", get(verify_email))
}
