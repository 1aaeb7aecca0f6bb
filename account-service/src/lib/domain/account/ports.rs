use async_trait::async_trait;

use crate::domain::account::models::AccessToken;
use crate::domain::account::models::Account;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::IdentityVerification;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::RegisterCommand;
use crate::account::errors::AccountError;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new password account.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, password and display name
    ///
    /// # Returns
    /// Created account entity
    ///
    /// # Errors
    /// * `EmailTaken` - Email is already registered (case-insensitively)
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError>;

    /// Exchange email and password for a bearer token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, wrong password, or account without a password
    /// * `Token` - Token generation failed
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<AccessToken, AccountError>;

    /// Exchange an identity provider token for a bearer token, provisioning
    /// the account on first use.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token rejected, wrong audience, or provider unavailable
    /// * `Token` - Token generation failed
    /// * `DatabaseError` - Database operation failed
    async fn federated_login(&self, provider_token: &str) -> Result<AccessToken, AccountError>;

    /// Resolve a bearer token to the account it was issued for.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token invalid or expired, or its account no longer exists
    /// * `DatabaseError` - Database operation failed
    async fn authenticate_token(&self, token: &str) -> Result<Account, AccountError>;
}

/// Persistence operations for account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Retrieve account by email address, ignoring case.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;

    /// Persist a new account; the store assigns its id.
    ///
    /// The uniqueness check and the insert are a single atomic step.
    ///
    /// # Errors
    /// * `EmailTaken` - Email is already registered (case-insensitively)
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: NewAccount) -> Result<Account, AccountError>;
}

/// Verification of identity tokens issued by a third-party provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Check an opaque provider token and return the verified profile.
    ///
    /// Never errors: every failure mode is one of the outcome variants.
    async fn verify(&self, id_token: &str) -> IdentityVerification;
}
