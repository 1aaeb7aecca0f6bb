//! Google Sign-In ID token verification.
//!
//! Tokens are checked against Google's `tokeninfo` endpoint, which validates
//! the signature and expiry and answers with the token's claims. This adapter
//! then enforces what the endpoint does not: the token must have been issued
//! by Google for our OAuth client id, and the email must be verified.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::account::errors::IdentityProviderError;
use crate::config::GoogleConfig;
use crate::domain::account::models::normalize_display_name;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::IdentityVerification;
use crate::domain::account::models::VerifiedIdentity;
use crate::domain::account::ports::IdentityVerifier;

pub const PROVIDER_NAME: &str = "google";

const ACCEPTED_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Claims returned by the tokeninfo endpoint. Google encodes booleans as
/// strings here, so `email_verified` accepts either form.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    iss: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    email_verified: Option<LooseBool>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Bool(bool),
    Text(String),
}

impl LooseBool {
    fn is_true(&self) -> bool {
        match self {
            LooseBool::Bool(value) => *value,
            LooseBool::Text(value) => value.eq_ignore_ascii_case("true"),
        }
    }
}

/// Identity verifier backed by Google's tokeninfo endpoint.
#[derive(Debug, Clone)]
pub struct GoogleIdentityVerifier {
    client: Client,
    client_id: String,
    tokeninfo_url: String,
    timeout: Duration,
}

impl GoogleIdentityVerifier {
    /// Build a verifier from service configuration.
    ///
    /// # Errors
    /// * `RequestFailed` - The HTTP client could not be constructed
    pub fn from_config(config: &GoogleConfig) -> Result<Self, IdentityProviderError> {
        Self::new(
            config.client_id.clone(),
            config.tokeninfo_url.clone(),
            config.timeout(),
        )
    }

    /// # Arguments
    /// * `client_id` - OAuth client id tokens must be issued for
    /// * `tokeninfo_url` - Endpoint to submit tokens to
    /// * `timeout` - Upper bound for one verification, connection included
    pub fn new(
        client_id: String,
        tokeninfo_url: String,
        timeout: Duration,
    ) -> Result<Self, IdentityProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityProviderError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            client_id,
            tokeninfo_url,
            timeout,
        })
    }

    /// `Ok(None)` means the provider rejected the token.
    async fn fetch_token_info(
        &self,
        id_token: &str,
    ) -> Result<Option<TokenInfo>, IdentityProviderError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), "Identity token rejected by provider");
            return Ok(None);
        }
        if status != StatusCode::OK {
            return Err(IdentityProviderError::UpstreamStatus(status.as_u16()));
        }

        response
            .json::<TokenInfo>()
            .await
            .map(Some)
            .map_err(|e| IdentityProviderError::InvalidResponse(e.to_string()))
    }

    fn request_error(&self, error: reqwest::Error) -> IdentityProviderError {
        if error.is_timeout() {
            IdentityProviderError::Timeout(self.timeout.as_millis())
        } else {
            IdentityProviderError::RequestFailed(error.to_string())
        }
    }

    fn check(&self, info: TokenInfo) -> IdentityVerification {
        if info.aud.as_deref() != Some(self.client_id.as_str()) {
            tracing::warn!(audience = ?info.aud, "Identity token issued for another client");
            return IdentityVerification::Invalid;
        }

        if !info
            .iss
            .as_deref()
            .is_some_and(|issuer| ACCEPTED_ISSUERS.contains(&issuer))
        {
            tracing::warn!(issuer = ?info.iss, "Identity token from unexpected issuer");
            return IdentityVerification::Invalid;
        }

        if !info.email_verified.as_ref().is_some_and(LooseBool::is_true) {
            tracing::info!("Identity token email is not verified");
            return IdentityVerification::Invalid;
        }

        let (Some(email), Some(subject)) = (info.email, info.sub) else {
            tracing::info!("Identity token lacks email or subject");
            return IdentityVerification::Invalid;
        };

        let Ok(email) = EmailAddress::new(email) else {
            tracing::info!("Identity token carries a malformed email");
            return IdentityVerification::Invalid;
        };

        IdentityVerification::Verified(VerifiedIdentity {
            email,
            display_name: normalize_display_name(info.name),
            provider: PROVIDER_NAME.to_string(),
            subject,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, id_token: &str) -> IdentityVerification {
        if id_token.trim().is_empty() {
            return IdentityVerification::Invalid;
        }

        let outcome = tokio::time::timeout(self.timeout, self.fetch_token_info(id_token)).await;

        match outcome {
            Ok(Ok(Some(info))) => self.check(info),
            Ok(Ok(None)) => IdentityVerification::Invalid,
            Ok(Err(e)) => IdentityVerification::Unavailable(e),
            Err(_) => IdentityVerification::Unavailable(IdentityProviderError::Timeout(
                self.timeout.as_millis(),
            )),
        }
    }
}
