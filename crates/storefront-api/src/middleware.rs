//! Request middleware: session reconciliation and the login guard.

use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::Response;
use storefront_core::error::DomainError;
use storefront_enduser::application::session_reconciliation::ReconciledSessions;
use storefront_enduser::domain::session::{
    SESSION_ACCOUNT_LIFETIME, SESSION_CART_LIFETIME, SessionId,
};
use storefront_enduser::domain::session_account::SessionAccount;

use crate::cookies;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the login session and guest cart named by the request cookies,
/// stores them as a [`ReconciledSessions`] request extension and refreshes
/// the cookies of any record whose lifetime was extended.
///
/// # Errors
///
/// Fails the request if a session store lookup fails.
pub async fn reconcile_sessions(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let account_session_id =
        cookies::read(request.headers(), SESSION_ACCOUNT_LIFETIME.cookie_name).map(SessionId::new);
    let cart_session_id =
        cookies::read(request.headers(), SESSION_CART_LIFETIME.cookie_name).map(SessionId::new);

    let reconciled = state
        .sessions
        .reconcile(account_session_id.as_ref(), cart_session_id.as_ref())
        .await?;

    let now = state.services.clock.now();
    let mut renewed = Vec::new();
    if let (Some(until), Some(session)) = (
        reconciled.session_account_renewed_until,
        &reconciled.session_account,
    ) {
        renewed.push((
            SESSION_ACCOUNT_LIFETIME.cookie_name,
            state.cookies.session_cookie(
                SESSION_ACCOUNT_LIFETIME.cookie_name,
                session.session_id.as_str(),
                until - now,
            )?,
        ));
    }
    if let (Some(until), Some(cart)) = (
        reconciled.session_cart_renewed_until,
        &reconciled.session_cart,
    ) {
        renewed.push((
            SESSION_CART_LIFETIME.cookie_name,
            state.cookies.session_cookie(
                SESSION_CART_LIFETIME.cookie_name,
                cart.session_id.as_str(),
                until - now,
            )?,
        ));
    }

    request.extensions_mut().insert(reconciled);
    let mut response = next.run(request).await;

    // A handler that replaced the session (login, logout) has the last word.
    for (name, cookie) in renewed {
        if !cookies::is_set(response.headers(), name) {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }
    Ok(response)
}

/// Rejects requests without a live login session.
///
/// # Errors
///
/// Returns `DomainError::LoginRequired` (401) when the request is anonymous.
pub async fn require_login(request: Request, next: Next) -> Result<Response, ApiError> {
    let logged_in = request
        .extensions()
        .get::<ReconciledSessions>()
        .is_some_and(|sessions| sessions.session_account.is_some());
    if !logged_in {
        return Err(ApiError(DomainError::LoginRequired));
    }
    Ok(next.run(request).await)
}

/// The login session of a request that passed [`require_login`].
///
/// # Errors
///
/// Returns `DomainError::LoginRequired` when the request is anonymous.
pub fn logged_in(sessions: &ReconciledSessions) -> Result<&SessionAccount, ApiError> {
    sessions
        .session_account
        .as_ref()
        .ok_or(ApiError(DomainError::LoginRequired))
}
