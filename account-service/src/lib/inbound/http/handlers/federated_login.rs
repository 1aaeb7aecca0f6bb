use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::AccessTokenData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

/// Sign in with an identity provider token (Google ID token).
pub async fn federated_login<AS: AccountServicePort>(
    State(state): State<AppState<AS>>,
    ApiJson(body): ApiJson<FederatedLoginRequest>,
) -> Result<ApiSuccess<AccessTokenData>, ApiError> {
    state
        .account_service
        .federated_login(&body.token)
        .await
        .map_err(ApiError::from)
        .map(|token| ApiSuccess::new(StatusCode::OK, token.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FederatedLoginRequest {
    token: String,
}
