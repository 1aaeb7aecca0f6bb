use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::EmailError;
use crate::account::errors::IdentityProviderError;
use crate::account::errors::PasswordPolicyError;

/// Account aggregate entity.
///
/// Represents a registered customer, created either by password registration
/// or by a first federated login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub federated_identity: Option<FederatedIdentity>,
    pub created_at: DateTime<Utc>,
}

/// Account unique identifier, assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Longest accepted address, the RFC 5321 forward-path limit.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. The original
/// spelling is kept for display; comparisons between accounts go through
/// [`EmailAddress::normalized`], which is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    /// * `TooLong` - Email is longer than [`MAX_EMAIL_LENGTH`]
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_string();
        let length = email.chars().count();
        if length > MAX_EMAIL_LENGTH {
            return Err(EmailError::TooLong {
                max: MAX_EMAIL_LENGTH,
                actual: length,
            });
        }
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookup key: the address lowercased.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether both addresses identify the same account.
    pub fn same_account_as(&self, other: &EmailAddress) -> bool {
        self.normalized() == other.normalized()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password supplied at registration.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// # Errors
    /// * `Empty` - Password is the empty string
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Link between an account and the identity provider that provisioned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    /// Provider name, e.g. `google`
    pub provider: String,
    /// Provider's stable identifier for the user
    pub subject: String,
}

/// Account data to persist; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: EmailAddress,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub federated_identity: Option<FederatedIdentity>,
}

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub display_name: Option<String>,
}

impl RegisterCommand {
    /// Construct a new register command.
    ///
    /// A blank display name is treated as absent.
    ///
    /// # Arguments
    /// * `email` - Validated email address
    /// * `password` - Plain text password (will be hashed by service)
    /// * `display_name` - Optional display name
    pub fn new(email: EmailAddress, password: Password, display_name: Option<String>) -> Self {
        Self {
            email,
            password,
            display_name: normalize_display_name(display_name),
        }
    }
}

/// Command to log in with email and password.
///
/// Fields are unvalidated on purpose: a malformed email must fail exactly
/// like an unknown one.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Bearer token handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// Profile attributes vouched for by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: EmailAddress,
    pub display_name: Option<String>,
    pub provider: String,
    pub subject: String,
}

/// Outcome of an identity token check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityVerification {
    /// The provider vouched for the token and it was issued for this service.
    Verified(VerifiedIdentity),
    /// The token was rejected or was issued for another audience.
    Invalid,
    /// The provider could not be reached or answered unexpectedly.
    Unavailable(IdentityProviderError),
}

pub(crate) fn normalize_display_name(display_name: Option<String>) -> Option<String> {
    display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
