//! Input validation for account registration.

use storefront_core::error::DomainError;

/// Longest accepted email address.
pub const EMAIL_MAX_LEN: usize = 255;
/// Shortest accepted password.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Longest accepted password.
pub const PASSWORD_MAX_LEN: usize = 50;
/// Symbols allowed in a password besides ASCII letters and digits.
pub const PASSWORD_SYMBOLS: &str = r##"!"#$%&'()"##;

/// Validates a registration request, collecting every failure.
///
/// # Errors
///
/// Returns `DomainError::Validation` listing all problems found.
pub fn validate_account_creation(
    email: &str,
    password: &str,
    password_confirmation: &str,
) -> Result<(), DomainError> {
    let mut messages = Vec::new();
    if let Some(message) = check_email(email) {
        messages.push(message);
    }
    if let Some(message) = check_password(password, password_confirmation) {
        messages.push(message);
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(messages))
    }
}

fn check_email(email: &str) -> Option<String> {
    if email.is_empty() {
        return Some("email address is required".to_owned());
    }
    if email.len() > EMAIL_MAX_LEN {
        return Some(format!(
            "email address must be at most {EMAIL_MAX_LEN} characters"
        ));
    }
    if !is_email_address(email) {
        return Some("email address is not valid".to_owned());
    }
    None
}

// Only the password's first problem is reported.
fn check_password(password: &str, confirmation: &str) -> Option<String> {
    if password.is_empty() {
        return Some("password is required".to_owned());
    }
    let length = password.chars().count();
    if length < PASSWORD_MIN_LEN {
        return Some(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        ));
    }
    if length > PASSWORD_MAX_LEN {
        return Some(format!(
            "password must be at most {PASSWORD_MAX_LEN} characters"
        ));
    }
    if !password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c))
    {
        return Some(format!(
            "password may only contain letters, digits and {PASSWORD_SYMBOLS}"
        ));
    }
    if password != confirmation {
        return Some("password confirmation does not match".to_owned());
    }
    None
}

fn is_email_address(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
