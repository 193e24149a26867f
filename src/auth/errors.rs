//! # Auth Errors
//!
//! Error types for session tokens and the access gate.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Session Errors
    // ==================

    /// No session cookie on the request
    #[error("Access denied. No session token provided")]
    MissingSession,

    /// Email/password pair did not match any participant
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ==================
    // Token Errors
    // ==================

    /// Token signature does not match the signing secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is structurally corrupt
    #[error("Malformed token")]
    MalformedToken,

    /// Token carries an expiry that has passed (only when expiry is configured)
    #[error("Token expired")]
    TokenExpired,

    // ==================
    // Authorization Errors
    // ==================

    /// Valid session, but not the administrator
    #[error("Access denied. Administrator only")]
    Forbidden,

    // ==================
    // Internal Errors
    // ==================

    /// Token signing failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    /// Credential sealing failed
    #[error("Internal error: credential hashing failed")]
    HashingFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error.
    ///
    /// Every verification failure shares 500 with internal failures; the
    /// variant keeps the precise cause for logs and tests.
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            AuthError::MissingSession => 401,
            AuthError::InvalidCredentials => 401,

            // 403 Forbidden
            AuthError::Forbidden => 403,

            // 500 Internal Server Error
            AuthError::InvalidSignature => 500,
            AuthError::MalformedToken => 500,
            AuthError::TokenExpired => 500,
            AuthError::TokenGenerationFailed => 500,
            AuthError::HashingFailed => 500,
        }
    }

    /// True when a presented token failed verification
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidSignature | AuthError::MalformedToken | AuthError::TokenExpired
        )
    }
}
