use thiserror::Error;

/// Error type for JWT operations.
///
/// Decoding failures deliberately carry no reason: a tampered, expired and
/// malformed token are indistinguishable to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid")]
    InvalidToken,
}
