//! Command handlers for the end-user context.
//!
//! Each handler runs in one storage transaction: open a unit of work,
//! mutate aggregates, persist them and publish the events they raised, then
//! commit. Any error rolls the transaction back. Side effects outside the
//! database (mail, payment provider, session store) are not undone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use storefront_core::aggregate::AggregateRoot;
use storefront_core::command::Command;
use storefront_core::error::DomainError;
use tracing::instrument;
use uuid::Uuid;

use super::services::EnduserServices;
use crate::domain::account::Account;
use crate::domain::adapters::TokenError;
use crate::domain::commands::{CreateAccountByEmail, LoginByEmail, Logout, VerifyEmail};
use crate::domain::events::EnduserEventPublisher;
use crate::domain::repositories::{SessionAccountRepository, UnitOfWork, UnitOfWorkHandle};
use crate::domain::session::{SESSION_ACCOUNT_LIFETIME, SessionId};
use crate::domain::session_account::SessionAccount;
use crate::domain::validation::validate_account_creation;

const LOGIN_REJECTED: &str = "email address or password is incorrect";

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCreated {
    /// The new, inactive account.
    pub account_id: Uuid,
}

/// Outcome of a successful login; the session id goes into the cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedIn {
    /// The logged-in account.
    pub account_id: Uuid,
    /// The new session.
    pub session_id: SessionId,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

/// Inserts `account` and publishes the events it raised.
async fn insert_account(
    unit_of_work: &dyn UnitOfWork,
    publisher: &EnduserEventPublisher,
    account: &mut Account,
) -> Result<(), DomainError> {
    unit_of_work.accounts().insert(account).await?;
    publisher.publish(account.clear_events()).await
}

/// Updates `account` and publishes the events it raised.
async fn update_account(
    unit_of_work: &dyn UnitOfWork,
    publisher: &EnduserEventPublisher,
    account: &mut Account,
) -> Result<(), DomainError> {
    unit_of_work.accounts().update(account).await?;
    publisher.publish(account.clear_events()).await
}

/// Stores `session_account` and publishes the events it raised.
async fn insert_session_account(
    sessions: &dyn SessionAccountRepository,
    publisher: &EnduserEventPublisher,
    session_account: &mut SessionAccount,
) -> Result<(), DomainError> {
    sessions
        .insert(session_account, SESSION_ACCOUNT_LIFETIME.ttl())
        .await?;
    publisher.publish(session_account.clear_events()).await
}

/// Commits on success, rolls back on failure.
async fn finish<T>(
    unit_of_work: &UnitOfWorkHandle,
    result: Result<T, DomainError>,
) -> Result<T, DomainError> {
    match result {
        Ok(value) => {
            unit_of_work.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = unit_of_work.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            if let DomainError::Inconsistency(detail) = &err {
                tracing::error!(%detail, "inconsistent aggregate state");
            }
            Err(err)
        }
    }
}

/// Handles the `CreateAccountByEmail` command: validates the input,
/// registers an inactive account and sends its verification mail.
///
/// # Errors
///
/// Returns `DomainError::Validation` for bad input or an email address that
/// is already registered, or the error of a failed mail send.
#[instrument(
    skip_all,
    fields(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id()
    )
)]
pub async fn handle_create_account_by_email(
    command: &CreateAccountByEmail,
    services: &EnduserServices,
) -> Result<AccountCreated, DomainError> {
    validate_account_creation(
        &command.email,
        &command.password,
        &command.password_confirmation,
    )?;

    let unit_of_work = services.transactions.begin().await?;
    let result = create_account(command, services, unit_of_work.as_ref()).await;
    let created = finish(&unit_of_work, result).await?;

    tracing::info!(account_id = %created.account_id, "account registered");
    Ok(created)
}

async fn create_account(
    command: &CreateAccountByEmail,
    services: &EnduserServices,
    unit_of_work: &dyn UnitOfWork,
) -> Result<AccountCreated, DomainError> {
    if let Some(existing) = unit_of_work.accounts().find_by_email(&command.email).await? {
        let message = if existing.is_active {
            "email address is already in use; please log in"
        } else {
            "email address is already in use; please check the verification email"
        };
        return Err(DomainError::validation(message));
    }

    let digest = services.password_hasher.hash(&command.password)?;
    let mut account =
        Account::create_by_email(services.ids.next_id(), command.email.clone(), digest);
    insert_account(unit_of_work, &services.publisher, &mut account).await?;

    Ok(AccountCreated {
        account_id: account.id,
    })
}

/// Handles the `VerifyEmail` command: activates the account named by the
/// token (creating its cart and payment customer) and logs it in.
///
/// # Errors
///
/// Returns `DomainError::Rejected` for an expired or invalid token or an
/// account that is already active, and `DomainError::Inconsistency` if the
/// token names no account.
#[instrument(
    skip_all,
    fields(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id()
    )
)]
pub async fn handle_verify_email(
    command: &VerifyEmail,
    services: &EnduserServices,
) -> Result<LoggedIn, DomainError> {
    let email = services
        .token_signer
        .verify(&command.token)
        .map_err(|err| match err {
            TokenError::Expired => DomainError::rejected(
                "the verification link has expired; request a new verification email",
            ),
            TokenError::InvalidSignature | TokenError::Other(_) => {
                tracing::warn!(error = %err, "verification token rejected");
                DomainError::rejected("the verification link is invalid")
            }
        })?;

    let unit_of_work = services.transactions.begin().await?;
    let result = activate_and_log_in(
        &email,
        command.guest_cart_session_id.clone(),
        services,
        &unit_of_work,
    )
    .await;
    let logged_in = finish(&unit_of_work, result).await?;

    tracing::info!(account_id = %logged_in.account_id, "account activated");
    Ok(logged_in)
}

async fn activate_and_log_in(
    email: &str,
    guest_cart_session_id: Option<SessionId>,
    services: &EnduserServices,
    unit_of_work: &UnitOfWorkHandle,
) -> Result<LoggedIn, DomainError> {
    let mut account = unit_of_work
        .accounts()
        .find_by_email(email)
        .await?
        .ok_or_else(|| DomainError::Inconsistency("verified email has no account".to_owned()))?;

    account.activate(Arc::clone(unit_of_work))?;
    update_account(unit_of_work.as_ref(), &services.publisher, &mut account).await?;

    log_in(account.id, guest_cart_session_id, services, unit_of_work).await
}

/// Handles the `LoginByEmail` command.
///
/// # Errors
///
/// Returns `DomainError::Rejected` with one message for an unknown email,
/// a non-email account or a wrong password, and a separate rejection for an
/// account that has not been verified yet.
#[instrument(
    skip_all,
    fields(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id()
    )
)]
pub async fn handle_login_by_email(
    command: &LoginByEmail,
    services: &EnduserServices,
) -> Result<LoggedIn, DomainError> {
    let unit_of_work = services.transactions.begin().await?;
    let result = authenticate_and_log_in(command, services, &unit_of_work).await;
    let logged_in = finish(&unit_of_work, result).await?;

    tracing::info!(account_id = %logged_in.account_id, "logged in");
    Ok(logged_in)
}

async fn authenticate_and_log_in(
    command: &LoginByEmail,
    services: &EnduserServices,
    unit_of_work: &UnitOfWorkHandle,
) -> Result<LoggedIn, DomainError> {
    let account = unit_of_work
        .accounts()
        .find_by_email(&command.email)
        .await?
        .ok_or_else(|| DomainError::rejected(LOGIN_REJECTED))?;

    let password_matches = account.uses_email_login()
        && account.password_digest.as_deref().is_some_and(|digest| {
            services.password_hasher.verify(&command.password, digest)
        });
    if !password_matches {
        return Err(DomainError::rejected(LOGIN_REJECTED));
    }
    if !account.is_active {
        return Err(DomainError::rejected(
            "the account is not verified yet; please check the verification email",
        ));
    }

    log_in(
        account.id,
        command.guest_cart_session_id.clone(),
        services,
        unit_of_work,
    )
    .await
}

/// Creates and stores a login session, running the login subscribers in
/// `unit_of_work`. The stored session is removed again if they fail.
async fn log_in(
    account_id: Uuid,
    guest_cart_session_id: Option<SessionId>,
    services: &EnduserServices,
    unit_of_work: &UnitOfWorkHandle,
) -> Result<LoggedIn, DomainError> {
    let session_id = SessionId::new(services.ids.next_id().to_string());
    let mut session_account = SessionAccount::create(
        session_id.clone(),
        account_id,
        guest_cart_session_id,
        Arc::clone(unit_of_work),
        services.clock.now(),
    );

    let sessions = services.session_accounts.as_ref();
    let inserted =
        insert_session_account(sessions, &services.publisher, &mut session_account).await;
    if let Err(err) = inserted {
        if let Err(cleanup_err) = sessions.delete(&session_id).await {
            tracing::warn!(
                %account_id,
                error = %cleanup_err,
                "failed to remove session after failed login"
            );
        }
        return Err(err);
    }

    Ok(LoggedIn {
        account_id,
        session_id,
        expires_at: session_account.expires_at,
    })
}

/// Handles the `Logout` command.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session store fails.
#[instrument(
    skip_all,
    fields(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id()
    )
)]
pub async fn handle_logout(
    command: &Logout,
    services: &EnduserServices,
) -> Result<(), DomainError> {
    services.session_accounts.delete(&command.session_id).await?;
    tracing::info!("logged out");
    Ok(())
}
