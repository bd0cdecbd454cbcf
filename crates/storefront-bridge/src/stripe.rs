//! Stripe customer creation over the REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use storefront_core::error::DomainError;
use storefront_enduser::domain::adapters::PaymentGateway;

/// Default Stripe API origin.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

/// Creates customers through `POST /v1/customers`.
#[derive(Clone)]
pub struct StripePaymentGateway {
    http_client: Client,
    api_base: String,
    secret_key: String,
}

impl StripePaymentGateway {
    /// Creates a gateway for `api_base` (no trailing slash) authenticated
    /// with `secret_key`.
    #[must_use]
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for StripePaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripePaymentGateway")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_customer(&self) -> Result<String, DomainError> {
        let response = self
            .http_client
            .post(format!("{}/v1/customers", self.api_base))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("stripe request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %error_body, "stripe customer creation failed");
            return Err(DomainError::Infrastructure(format!(
                "stripe customer creation failed with status {status}"
            )));
        }

        let customer: CustomerResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("stripe response unreadable: {e}")))?;

        tracing::info!(customer_id = %customer.id, "stripe customer created");
        Ok(customer.id)
    }
}
