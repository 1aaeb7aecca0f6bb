use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;
use argon2::Params;

use super::errors::PasswordError;

/// Marks a stored hash that no password can ever match.
///
/// `!` never starts a PHC string, so such values fail to parse in `verify`.
const PLACEHOLDER_PREFIX: char = '!';

const DECOY_SALT: &str = "YWNjb3VudC1kZWNveS0xNg";

/// 32 zero bytes, the default Argon2 output length.
const DECOY_OUTPUT: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id).
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher instance configured with secure defaults
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password securely.
    ///
    /// Uses Argon2id with a random salt generated for every call, so hashing the
    /// same password twice yields different strings.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// A hash that cannot be parsed (including placeholders) never matches.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Generate a random stored-hash value that no password verifies against.
    ///
    /// Used for accounts that only sign in through an identity provider.
    pub fn placeholder(&self) -> String {
        let salt = SaltString::generate(&mut OsRng);
        format!("{}{}", PLACEHOLDER_PREFIX, salt.as_str())
    }

    /// Well-formed Argon2id hash, with the parameters `hash` uses, that no
    /// password is expected to match.
    ///
    /// Verifying against it costs the same as verifying a real password, so
    /// rejections for missing or password-less accounts take as long as a
    /// wrong password does.
    pub fn decoy(&self) -> String {
        format!(
            "$argon2id$v=19$m={},t={},p={}${}${}",
            Params::DEFAULT_M_COST,
            Params::DEFAULT_T_COST,
            Params::DEFAULT_P_COST,
            DECOY_SALT,
            DECOY_OUTPUT
        )
    }

    /// Check whether a stored hash was produced by [`PasswordHasher::placeholder`].
    pub fn is_placeholder(&self, hash: &str) -> bool {
        hash.starts_with(PLACEHOLDER_PREFIX)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
