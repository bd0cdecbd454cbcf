//! Route modules. Everything under `private` requires a login.

pub mod accounts;
pub mod cart;
pub mod health;
pub mod sessions;

use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use chrono::{DateTime, Utc};
use storefront_enduser::application::command_handlers::LoggedIn;
use storefront_enduser::domain::session::{
    SESSION_ACCOUNT_LIFETIME, SESSION_CART_LIFETIME, SessionId,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Routes reachable only with a live login session.
pub fn private_router() -> Router<AppState> {
    Router::new()
        .merge(sessions::private_router())
        .merge(cart::router())
}

/// Cookies for a freshly created login session. The guest cart cookie is
/// dropped too once the login consumed that guest cart; an empty guest cart
/// is left alone and keeps its cookie.
pub(crate) async fn login_cookies(
    state: &AppState,
    logged_in: &LoggedIn,
    guest_cart_session_id: Option<&SessionId>,
    now: DateTime<Utc>,
) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        state.cookies.session_cookie(
            SESSION_ACCOUNT_LIFETIME.cookie_name,
            logged_in.session_id.as_str(),
            logged_in.expires_at - now,
        )?,
    );
    if let Some(session_id) = guest_cart_session_id {
        let consumed = state
            .services
            .session_carts
            .find_by_session_id(session_id)
            .await?
            .is_none();
        if consumed {
            headers.append(
                SET_COOKIE,
                state
                    .cookies
                    .removal_cookie(SESSION_CART_LIFETIME.cookie_name)?,
            );
        }
    }
    Ok(headers)
}
