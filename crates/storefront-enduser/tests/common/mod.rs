//! Shared fixture for the end-user integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use storefront_core::error::DomainError;
use storefront_enduser::application::command_handlers::{
    LoggedIn, handle_create_account_by_email, handle_verify_email,
};
use storefront_enduser::application::services::EnduserServices;
use storefront_enduser::application::wiring::{SubscriberDependencies, build_publisher};
use storefront_enduser::domain::account::Account;
use storefront_enduser::domain::cart::Cart;
use storefront_enduser::domain::commands::{CreateAccountByEmail, VerifyEmail};
use storefront_enduser::domain::product::{Product, ProductStatus};
use storefront_enduser::domain::session::SessionId;
use storefront_enduser::domain::session_cart::SessionCartLine;
use storefront_enduser::domain::subscribers::VerificationMailSettings;
use storefront_test_support::{
    FakePaymentGateway, FakeTokenSigner, FixedClock, InMemoryDatabase, InMemorySessionStore,
    PlainPasswordHasher, RecordingMailSender, SequentialIds,
};
use uuid::Uuid;

pub const PASSWORD: &str = "abcd1234!";
pub const BACKEND_URL: &str = "http://localhost:3000";

pub struct Harness {
    pub database: InMemoryDatabase,
    pub sessions: Arc<InMemorySessionStore>,
    pub mail: Arc<RecordingMailSender>,
    pub payments: Arc<FakePaymentGateway>,
    pub tokens: Arc<FakeTokenSigner>,
    pub clock: FixedClock,
    pub services: EnduserServices,
}

impl Harness {
    pub fn new() -> Self {
        let clock = FixedClock::default_instant();
        let database = InMemoryDatabase::new();
        let sessions = Arc::new(InMemorySessionStore::new(Arc::new(clock)));
        let mail = Arc::new(RecordingMailSender::new());
        let payments = Arc::new(FakePaymentGateway::new());
        let tokens = Arc::new(FakeTokenSigner::new());
        let ids = Arc::new(SequentialIds::starting_at(1000));

        let publisher = build_publisher(SubscriberDependencies {
            mail_sender: mail.clone(),
            payment_gateway: payments.clone(),
            token_signer: tokens.clone(),
            session_carts: sessions.clone(),
            ids: ids.clone(),
            verification: VerificationMailSettings {
                from: "no-reply@storefront.local".to_owned(),
                backend_url: BACKEND_URL.to_owned(),
            },
        });

        let services = EnduserServices {
            transactions: Arc::new(database.clone()),
            session_accounts: sessions.clone(),
            session_carts: sessions.clone(),
            publisher: Arc::new(publisher),
            token_signer: tokens.clone(),
            password_hasher: Arc::new(PlainPasswordHasher),
            clock: Arc::new(clock),
            ids,
        };

        Self {
            database,
            sessions,
            mail,
            payments,
            tokens,
            clock,
            services,
        }
    }

    pub async fn register(&self, email: &str) -> Result<Uuid, DomainError> {
        let command = CreateAccountByEmail {
            correlation_id: Uuid::new_v4(),
            email: email.to_owned(),
            password: PASSWORD.to_owned(),
            password_confirmation: PASSWORD.to_owned(),
        };
        handle_create_account_by_email(&command, &self.services)
            .await
            .map(|created| created.account_id)
    }

    /// Token embedded in the most recent verification mail.
    pub fn last_token(&self) -> String {
        let sent = self.mail.sent();
        let body = &sent.last().expect("no mail sent").body_html;
        let start = body.find("token=").expect("no token in mail") + "token=".len();
        let end = start + body[start..].find('"').expect("unterminated link");
        body[start..end].to_owned()
    }

    pub async fn verify(
        &self,
        token: String,
        guest_cart_session_id: Option<SessionId>,
    ) -> Result<LoggedIn, DomainError> {
        let command = VerifyEmail {
            correlation_id: Uuid::new_v4(),
            token,
            guest_cart_session_id,
        };
        handle_verify_email(&command, &self.services).await
    }

    /// Seeds an active email account with an empty cart.
    pub fn seed_active_account(&self, id: u128, email: &str) -> (Account, Cart) {
        let mut account = Account::create_by_email(
            Uuid::from_u128(id),
            email.to_owned(),
            format!("plain:{PASSWORD}"),
        );
        account.is_active = true;
        let cart = Cart::create(Uuid::from_u128(id + 500), account.id);
        self.database.seed_account(&account);
        self.database.seed_cart(&cart);
        (account, cart)
    }

    pub fn seed_product(&self, id: u128, status: ProductStatus, stock_count: u32) -> Uuid {
        let product_id = Uuid::from_u128(id);
        self.database.seed_product(Product {
            id: product_id,
            status,
            stock_count,
        });
        product_id
    }

    pub fn seed_guest_cart(&self, session: &str, lines: &[(Uuid, u32)]) -> SessionId {
        let session_id = SessionId::new(session);
        self.sessions.seed_session_cart(
            &session_id,
            lines
                .iter()
                .map(|&(product_id, quantity)| SessionCartLine {
                    product_id,
                    quantity,
                })
                .collect(),
            self.clock.0 + Duration::days(20),
        );
        session_id
    }
}
