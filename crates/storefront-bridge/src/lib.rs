//! Storefront: adapters binding the end-user domain to external services.
//!
//! Every type here implements one of the outbound traits declared in
//! `storefront_enduser::domain::adapters`.

pub mod jwt;
pub mod mail;
pub mod password;
pub mod stripe;

pub use jwt::JwtTokenSigner;
pub use mail::ConsoleMailSender;
pub use password::Argon2PasswordHasher;
pub use stripe::StripePaymentGateway;
