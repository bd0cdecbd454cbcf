//! Server configuration read from the environment.

use std::net::SocketAddr;

use crate::error::AppError;

/// Everything the server reads from the environment at startup.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Redis connection string for the session stores.
    pub redis_url: String,
    /// Secret used to sign email-verification tokens.
    pub jwt_secret_key: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Public origin of this server, used in verification links.
    pub backend_url: String,
    /// Domain attribute for session cookies; host-only when absent.
    pub cookie_domain: Option<String>,
    /// Sender address of outgoing mail.
    pub mail_from: String,
    /// Stripe API secret key.
    pub stripe_secret_key: String,
    /// Stripe API origin.
    pub stripe_api_base: String,
    /// OTLP collector endpoint; spans are only exported when set.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment, loading a
    /// `.env` file first when one exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::Config(format!("{name} environment variable must be set")))
        };
        let optional = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            jwt_secret_key: required("JWT_SECRET_KEY")?,
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            backend_url: optional("BACKEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_owned())
                .trim_end_matches('/')
                .to_owned(),
            cookie_domain: optional("COOKIE_DOMAIN"),
            mail_from: optional("MAIL_FROM")
                .unwrap_or_else(|| "no-reply@storefront.local".to_owned()),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_api_base: optional("STRIPE_API_BASE")
                .unwrap_or_else(|| storefront_bridge::stripe::DEFAULT_API_BASE.to_owned()),
            otlp_endpoint: optional("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("backend_url", &self.backend_url)
            .field("cookie_domain", &self.cookie_domain)
            .field("mail_from", &self.mail_from)
            .field("stripe_api_base", &self.stripe_api_base)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .finish_non_exhaustive()
    }
}
