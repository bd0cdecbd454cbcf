//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::Duration;
use http_body_util::BodyExt;
use storefront_enduser::application::services::EnduserServices;
use storefront_enduser::application::wiring::{SubscriberDependencies, build_publisher};
use storefront_enduser::domain::account::Account;
use storefront_enduser::domain::cart::Cart;
use storefront_enduser::domain::product::{Product, ProductStatus};
use storefront_enduser::domain::session::SessionId;
use storefront_enduser::domain::session_cart::SessionCartLine;
use storefront_enduser::domain::subscribers::VerificationMailSettings;
use storefront_test_support::{
    FakePaymentGateway, FakeTokenSigner, FixedClock, InMemoryDatabase, InMemorySessionStore,
    PlainPasswordHasher, RecordingMailSender, SequentialIds,
};
use tower::ServiceExt;
use uuid::Uuid;

use storefront_api::build_router;
use storefront_api::cookies::CookieSettings;
use storefront_api::state::AppState;

pub const PASSWORD: &str = "abcd1234!";

/// The router plus handles on every in-memory double behind it.
pub struct TestApp {
    pub router: Router,
    pub database: InMemoryDatabase,
    pub sessions: Arc<InMemorySessionStore>,
    pub mail: Arc<RecordingMailSender>,
    pub payments: Arc<FakePaymentGateway>,
    pub clock: FixedClock,
}

/// A response with its decoded JSON body (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: serde_json::Value,
}

impl TestResponse {
    /// All `Set-Cookie` values of the response.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_owned())
            .collect()
    }

    /// The `Set-Cookie` value for `name`, if any.
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        self.set_cookies()
            .into_iter()
            .find(|cookie| cookie.starts_with(&format!("{name}=")))
    }

    /// The value part of the `Set-Cookie` for `name`.
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.set_cookie(name).map(|cookie| {
            let pair = cookie.split(';').next().unwrap();
            pair[name.len() + 1..].to_owned()
        })
    }
}

impl TestApp {
    /// Build the full app router over in-memory doubles and a fixed clock.
    /// Uses the same route structure as `main.rs`.
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
                backend_url: "http://localhost:3000".to_owned(),
            },
        });

        let services = EnduserServices {
            transactions: Arc::new(database.clone()),
            session_accounts: sessions.clone(),
            session_carts: sessions.clone(),
            publisher: Arc::new(publisher),
            token_signer: tokens,
            password_hasher: Arc::new(PlainPasswordHasher),
            clock: Arc::new(clock),
            ids,
        };
        let state = AppState::new(services, CookieSettings::default());

        Self {
            router: build_router(state),
            database,
            sessions,
            mail,
            payments,
            clock,
        }
    }

    /// Send a request and decode the response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body_bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap()
        };
        TestResponse {
            status,
            headers,
            json,
        }
    }

    /// Send a request with a JSON body.
    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: &serde_json::Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(serde_json::to_vec(body).unwrap())).unwrap())
            .await
    }

    /// Send a request without a body.
    pub async fn send_empty(&self, method: &str, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Token embedded in the most recent verification mail.
    pub fn last_token(&self) -> String {
        let sent = self.mail.sent();
        let body = &sent.last().unwrap().body_html;
        let start = body.find("token=").unwrap() + "token=".len();
        let end = start + body[start..].find('"').unwrap();
        body[start..end].to_owned()
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

    pub fn seed_product(&self, id: u128, stock_count: u32) -> Uuid {
        let product_id = Uuid::from_u128(id);
        self.database.seed_product(Product {
            id: product_id,
            status: ProductStatus::OnSale,
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

    /// Seeds a login session for `account_id` with `remaining` lifetime.
    pub fn seed_login(&self, session: &str, account_id: Uuid, remaining: Duration) -> SessionId {
        let session_id = SessionId::new(session);
        self.sessions
            .seed_session_account(&session_id, account_id, self.clock.0 + remaining);
        session_id
    }
}
