//! Cart of the logged-in account.

use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use storefront_enduser::application::query_handlers::{self, CartView};
use storefront_enduser::application::session_reconciliation::ReconciledSessions;

use crate::error::ApiError;
use crate::middleware::logged_in;
use crate::state::AppState;

/// GET /cart
async fn get_cart(
    State(state): State<AppState>,
    Extension(sessions): Extension<ReconciledSessions>,
) -> Result<Json<CartView>, ApiError> {
    let session = logged_in(&sessions)?;
    let view = query_handlers::get_cart_for_account(
        session.account_id,
        state.services.transactions.as_ref(),
    )
    .await?;
    Ok(Json(view))
}

/// Returns the router for cart endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/cart", get(get_cart))
}
