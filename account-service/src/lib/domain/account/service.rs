use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::account::errors::AccountError;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::account::ports::IdentityVerifier;
use crate::domain::account::models::AccessToken;
use crate::domain::account::models::Account;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::FederatedIdentity;
use crate::domain::account::models::IdentityVerification;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::Password;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::VerifiedIdentity;

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
/// Every low-level failure is normalised here: callers only ever see
/// `EmailTaken`, `InvalidCredentials` or an internal error.
pub struct AccountService<AR, IV>
where
    AR: AccountRepository,
    IV: IdentityVerifier,
{
    repository: Arc<AR>,
    identity_verifier: Arc<IV>,
    authenticator: Arc<Authenticator>,
}

impl<AR, IV> AccountService<AR, IV>
where
    AR: AccountRepository,
    IV: IdentityVerifier,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `identity_verifier` - External identity provider
    /// * `authenticator` - Password hashing and token issuance
    ///
    /// # Returns
    /// Configured account service instance
    pub fn new(
        repository: Arc<AR>,
        identity_verifier: Arc<IV>,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        Self {
            repository,
            identity_verifier,
            authenticator,
        }
    }

    // Argon2 is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, password: Password) -> Result<String, AccountError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.as_str()))
            .await
            .map_err(|e| AccountError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(AccountError::from)
    }

    async fn provision(&self, identity: VerifiedIdentity) -> Result<Account, AccountError> {
        let email = identity.email.clone();
        let new_account = NewAccount {
            email: identity.email,
            password_hash: self.authenticator.placeholder_hash(),
            display_name: identity.display_name,
            federated_identity: Some(FederatedIdentity {
                provider: identity.provider,
                subject: identity.subject,
            }),
        };

        match self.repository.create(new_account).await {
            Ok(account) => {
                tracing::info!(
                    account_id = %account.id,
                    provider = ?account.federated_identity.as_ref().map(|f| f.provider.as_str()),
                    "Account provisioned from federated login"
                );
                Ok(account)
            }
            // A concurrent login provisioned it first
            Err(AccountError::EmailTaken(_)) => self
                .repository
                .find_by_email(&email)
                .await?
                .ok_or_else(|| {
                    AccountError::Unknown("Account missing after conflicting insert".to_string())
                }),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<AR, IV> AccountServicePort for AccountService<AR, IV>
where
    AR: AccountRepository,
    IV: IdentityVerifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            return Err(AccountError::EmailTaken(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let account = self
            .repository
            .create(NewAccount {
                email: command.email,
                password_hash,
                display_name: command.display_name,
                federated_identity: None,
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(account)
    }

    async fn login(&self, command: LoginCommand) -> Result<AccessToken, AccountError> {
        let Ok(email) = EmailAddress::new(command.email) else {
            return Err(AccountError::InvalidCredentials);
        };

        let account = self.repository.find_by_email(&email).await?;

        let authenticator = Arc::clone(&self.authenticator);
        let stored = account
            .as_ref()
            .map(|account| (account.password_hash.clone(), account.email.as_str().to_string()));
        let password = command.password;

        // Unknown emails still pay for one Argon2 verification
        let result = tokio::task::spawn_blocking(move || match stored {
            Some((stored_hash, subject)) => {
                authenticator.authenticate(&password, &stored_hash, &subject)
            }
            None => Err(authenticator.reject(&password)),
        })
        .await
        .map_err(|e| AccountError::Unknown(format!("Password verification task failed: {}", e)))?;

        let Some(account) = account else {
            tracing::debug!("Login rejected: unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        match result {
            Ok(result) => {
                tracing::info!(account_id = %account.id, "Login succeeded");
                Ok(AccessToken::bearer(result.access_token))
            }
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::info!(account_id = %account.id, "Login rejected");
                Err(AccountError::InvalidCredentials)
            }
            Err(AuthenticationError::JwtError(e)) => Err(AccountError::Token(e)),
        }
    }

    async fn federated_login(&self, provider_token: &str) -> Result<AccessToken, AccountError> {
        let identity = match self.identity_verifier.verify(provider_token).await {
            IdentityVerification::Verified(identity) => identity,
            IdentityVerification::Invalid => {
                tracing::info!("Federated login rejected: identity token invalid");
                return Err(AccountError::InvalidCredentials);
            }
            IdentityVerification::Unavailable(e) => {
                tracing::warn!(error = %e, "Federated login failed: identity provider unavailable");
                return Err(AccountError::InvalidCredentials);
            }
        };

        let account = match self.repository.find_by_email(&identity.email).await? {
            Some(account) => account,
            None => self.provision(identity).await?,
        };

        let access_token = self.authenticator.issue_token(account.email.as_str())?;
        tracing::info!(account_id = %account.id, "Federated login succeeded");

        Ok(AccessToken::bearer(access_token))
    }

    async fn authenticate_token(&self, token: &str) -> Result<Account, AccountError> {
        let claims = self
            .authenticator
            .validate_token(token)
            .map_err(|_| AccountError::InvalidCredentials)?;

        let email = EmailAddress::new(claims.sub).map_err(|_| AccountError::InvalidCredentials)?;

        self.repository
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)
    }
}
