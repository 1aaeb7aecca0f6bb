use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_account::current_account;
use super::handlers::federated_login::federated_login;
use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::account::ports::AccountServicePort;

pub struct AppState<AS: AccountServicePort> {
    pub account_service: Arc<AS>,
}

impl<AS: AccountServicePort> Clone for AppState<AS> {
    fn clone(&self) -> Self {
        Self {
            account_service: Arc::clone(&self.account_service),
        }
    }
}

pub fn create_router<AS: AccountServicePort>(account_service: Arc<AS>) -> Router {
    let state = AppState { account_service };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/register", post(register::<AS>))
        .route("/login", post(login::<AS>))
        .route("/auth/federated", post(federated_login::<AS>));

    let protected_routes = Router::new()
        .route("/me", get(current_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AS>,
        ));

    // Headers are not recorded: they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::Authenticator;
    use axum::http::header::AUTHORIZATION;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::account::models::IdentityVerification;
    use crate::domain::account::ports::IdentityVerifier;
    use crate::domain::account::service::AccountService;
    use crate::outbound::repositories::InMemoryAccountRepository;

    struct RejectingVerifier;

    #[async_trait]
    impl IdentityVerifier for RejectingVerifier {
        async fn verify(&self, _id_token: &str) -> IdentityVerification {
            IdentityVerification::Invalid
        }
    }

    fn app() -> Router {
        let service = AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::new(RejectingVerifier),
            Arc::new(Authenticator::new(b"router_test_secret_at_least_32_bytes")),
        );
        create_router(Arc::new(service))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_register_and_fetch_me() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/register",
                json!({ "email": "a@x.com", "password": "secret123" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({ "id": 1, "email": "a@x.com" })
        );

        let response = app
            .clone()
            .oneshot(post_json(
                "/login",
                json!({ "email": "a@x.com", "password": "secret123" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["token_type"], "bearer");
        let token = body["access_token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::get("/me")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["email"], "a@x.com");
    }

    #[tokio::test]
    async fn test_me_requires_bearer_token() {
        let response = app()
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_me_rejects_invalid_token() {
        let response = app()
            .oneshot(
                Request::get("/me")
                    .header(AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "InvalidCredentials");
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let response = app()
            .oneshot(post_json(
                "/register",
                json!({ "email": "not-an-email", "password": "secret123" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], "ValidationError");
    }

    #[tokio::test]
    async fn test_unparseable_bodies_use_error_body() {
        let malformed = Request::builder()
            .method("POST")
            .uri("/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{\"email\": "))
            .unwrap();
        let missing_field = post_json("/register", json!({ "email": "a@x.com" }));
        let no_content_type = Request::builder()
            .method("POST")
            .uri("/auth/federated")
            .body(Body::from("token=abc"))
            .unwrap();

        for request in [malformed, missing_field, no_content_type] {
            let response = app().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
            let body = body_json(response).await;
            assert_eq!(body["error"], "ValidationError");
            assert!(body["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_federated_login_rejected() {
        let response = app()
            .oneshot(post_json("/auth/federated", json!({ "token": "anything" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "InvalidCredentials");
    }
}
