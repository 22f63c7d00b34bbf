use thiserror::Error;

/// Error type for token encoding and validation.
///
/// `Malformed`, `InvalidSignature`, and `Expired` are deliberately distinct:
/// callers log them separately but must collapse them into one outward
/// "invalid credential" response so a caller never learns which check
/// rejected the token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token cannot be parsed")]
    Malformed,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

/// Error for role parsing failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}
