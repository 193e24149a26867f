//! # Session Token Codec
//!
//! Signed session tokens carried in the `token` cookie.
//!
//! Tokens bind a participant id and, after login, the participant's email.
//! By default no `exp` claim is written and none is required, so a token
//! stays valid until the signing secret changes. Setting
//! [`TokenConfig::ttl`] adds an expiry without changing that default.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use crate::participants::model::ParticipantId;

/// Name of the cookie that carries the session token
pub const SESSION_COOKIE: &str = "token";

/// Claims bound into a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Participant identity
    pub id: ParticipantId,

    /// Participant email (present for tokens issued at login)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,

    /// Expiration timestamp, only when a ttl is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl SessionClaims {
    /// Claims for a freshly registered participant
    pub fn for_id(id: ParticipantId) -> Self {
        Self {
            id,
            email: None,
            iat: Utc::now().timestamp(),
            exp: None,
        }
    }

    /// Claims for a participant that logged in with an email
    pub fn for_login(id: ParticipantId, email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::for_id(id)
        }
    }
}

/// Token codec configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret for signing
    pub secret: String,

    /// Optional token lifetime; `None` means unbounded
    pub ttl: Option<Duration>,
}

impl TokenConfig {
    /// Unbounded tokens signed with `secret`
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: None,
        }
    }

    /// Add an expiry to issued tokens
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct SessionCodec {
    ttl: Option<Duration>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionCodec {
    /// Create a codec from configuration loaded at startup
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            ttl: config.ttl,
            encoding_key,
            decoding_key,
        }
    }

    /// Sign `claims` into a token, stamping `exp` when a ttl is configured
    pub fn issue(&self, mut claims: SessionClaims) -> AuthResult<String> {
        if let Some(ttl) = self.ttl {
            claims.exp = Some(claims.iat + ttl.num_seconds());
        }

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)
    }

    /// Verify a token's signature and structure and return its claims.
    ///
    /// Age is only checked when the token itself carries `exp`.
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = true;

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AuthError::InvalidSignature
                    }
                    _ => AuthError::MalformedToken,
                }
            })?;

        Ok(token_data.claims)
    }
}
