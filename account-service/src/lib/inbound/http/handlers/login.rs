use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::AccessTokenData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn login<AS: AccountServicePort>(
    State(state): State<AppState<AS>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<ApiSuccess<AccessTokenData>, ApiError> {
    let command = LoginCommand {
        email: body.email,
        password: body.password,
    };

    state
        .account_service
        .login(command)
        .await
        .map_err(ApiError::from)
        .map(|token| ApiSuccess::new(StatusCode::OK, token.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
