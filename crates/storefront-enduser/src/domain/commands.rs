//! Commands for the end-user context.

use std::fmt;

use storefront_core::command::Command;
use uuid::Uuid;

use super::session::SessionId;

/// Command to register an account with email and password.
#[derive(Clone)]
pub struct CreateAccountByEmail {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Email address to register.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password typed a second time.
    pub password_confirmation: String,
}

impl fmt::Debug for CreateAccountByEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAccountByEmail")
            .field("correlation_id", &self.correlation_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Command for CreateAccountByEmail {
    fn command_type(&self) -> &'static str {
        "enduser.create_account_by_email"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to verify an email address with the token from the
/// verification mail, logging the account in.
#[derive(Debug, Clone)]
pub struct VerifyEmail {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Signed token from the verification link.
    pub token: String,
    /// Guest cart of the browser, if any.
    pub guest_cart_session_id: Option<SessionId>,
}

impl Command for VerifyEmail {
    fn command_type(&self) -> &'static str {
        "enduser.verify_email"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to log in with email and password.
#[derive(Clone)]
pub struct LoginByEmail {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Guest cart of the browser, if any.
    pub guest_cart_session_id: Option<SessionId>,
}

impl fmt::Debug for LoginByEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginByEmail")
            .field("correlation_id", &self.correlation_id)
            .field("email", &self.email)
            .field("guest_cart_session_id", &self.guest_cart_session_id)
            .finish_non_exhaustive()
    }
}

impl Command for LoginByEmail {
    fn command_type(&self) -> &'static str {
        "enduser.login_by_email"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to end a login session.
#[derive(Debug, Clone)]
pub struct Logout {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to end.
    pub session_id: SessionId,
}

impl Command for Logout {
    fn command_type(&self) -> &'static str {
        "enduser.logout"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_omits_passwords() {
        let command = LoginByEmail {
            correlation_id: Uuid::nil(),
            email: "user@example.com".to_owned(),
            password: "hunter22secret".to_owned(),
            guest_cart_session_id: None,
        };
        let rendered = format!("{command:?}");
        assert!(rendered.contains("user@example.com"));
        assert!(!rendered.contains("hunter22secret"));
        assert_eq!(command.command_type(), "enduser.login_by_email");
    }
}
