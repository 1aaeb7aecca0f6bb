use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::identity::GoogleIdentityVerifier;
use account_service::outbound::repositories::InMemoryAccountRepository;
use auth::Authenticator;
use auth::JwtHandler;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const GOOGLE_CLIENT_ID: &str = "pharmacy-web.apps.googleusercontent.com";

/// Test application that spawns a real server backed by the in-memory store
/// and a local stand-in for Google's tokeninfo endpoint.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<InMemoryAccountRepository>,
    pub google: FakeGoogle,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

/// Tokeninfo stand-in. Tokens answer with whatever claims were registered for them;
/// unknown tokens get the 400 Google sends for bad tokens.
#[derive(Clone, Default)]
pub struct FakeGoogle {
    tokens: Arc<Mutex<HashMap<String, Value>>>,
}

impl FakeGoogle {
    /// Register a well-formed ID token for `email` issued to this service.
    pub fn issue_token(&self, email: &str, subject: &str) -> String {
        self.issue_token_for_audience(email, subject, GOOGLE_CLIENT_ID)
    }

    pub fn issue_token_for_audience(&self, email: &str, subject: &str, audience: &str) -> String {
        let token = format!("google-id-token-{}", uuid::Uuid::new_v4());
        self.tokens.lock().unwrap().insert(
            token.clone(),
            json!({
                "iss": "https://accounts.google.com",
                "aud": audience,
                "sub": subject,
                "email": email,
                "email_verified": "true",
                "name": "Federated User",
            }),
        );
        token
    }

    async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = listener.local_addr().unwrap();
        let router = Router::new()
            .route("/tokeninfo", get(tokeninfo))
            .with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Tokeninfo stub error");
        });

        format!("http://{}/tokeninfo", address)
    }
}

async fn tokeninfo(
    State(google): State<FakeGoogle>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let claims = params
        .get("id_token")
        .and_then(|token| google.tokens.lock().unwrap().get(token).cloned());

    match claims {
        Some(claims) => Json(claims).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_token" })),
        )
            .into_response(),
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let google = FakeGoogle::default();
        let tokeninfo_url = google.spawn().await;

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryAccountRepository::new());
        let identity_verifier = Arc::new(
            GoogleIdentityVerifier::new(
                GOOGLE_CLIENT_ID.to_string(),
                tokeninfo_url,
                Duration::from_secs(5),
            )
            .expect("Failed to create identity verifier"),
        );
        let authenticator = Arc::new(Authenticator::new(JWT_SECRET));

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&repository),
            identity_verifier,
            authenticator,
        ));

        let router = create_router(account_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            google,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an account and return the response
    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/register")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Exchange an identity provider token and return the response
    pub async fn federated_login(&self, token: &str) -> reqwest::Response {
        self.post("/auth/federated")
            .json(&json!({ "token": token }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
