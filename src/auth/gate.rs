//! # Access Control Gate
//!
//! Stateless per-request authentication (session cookie → [`Identity`])
//! and authorization (identity → role). The gate keeps no session table;
//! everything it knows comes from the signed token.

use axum::http::{header::COOKIE, HeaderMap};

use super::errors::{AuthError, AuthResult};
use super::token::{SessionClaims, SessionCodec, SESSION_COOKIE};
use crate::participants::model::ParticipantId;

/// Default address of the single administrator
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@skatepark.com";

/// Authenticated caller, derived from a verified session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: ParticipantId,
    pub email: Option<String>,
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
        }
    }
}

/// Privilege a route requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Participant,
    Administrator,
}

/// Proof that the gate authorized an administrator.
///
/// Only [`AccessGate::admin`] can build one, so privileged lifecycle
/// transitions cannot be reached without passing the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Administrator {
    identity: Identity,
}

impl Administrator {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Request-level authentication and authorization
#[derive(Clone)]
pub struct AccessGate {
    codec: SessionCodec,
    admin_email: String,
}

impl AccessGate {
    pub fn new(codec: SessionCodec, admin_email: impl Into<String>) -> Self {
        Self {
            codec,
            admin_email: admin_email.into(),
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Whether `email` is the administrator address
    pub fn is_admin_email(&self, email: &str) -> bool {
        email == self.admin_email
    }

    /// Whether registering `email` would create a second administrator.
    /// Case and surrounding whitespace are ignored.
    pub fn is_reserved_email(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.admin_email)
    }

    /// Resolve the caller from the session cookie.
    ///
    /// A missing (or empty) cookie is [`AuthError::MissingSession`]; a
    /// present cookie that fails verification keeps its precise cause.
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        let token = session_token(headers).ok_or(AuthError::MissingSession)?;
        let claims = self.codec.verify(token)?;
        Ok(Identity::from(claims))
    }

    /// Check that `identity` holds `role`
    pub fn authorize(&self, identity: &Identity, role: Role) -> AuthResult<()> {
        match role {
            Role::Participant => Ok(()),
            Role::Administrator => match identity.email.as_deref() {
                Some(email) if self.is_admin_email(email) => Ok(()),
                _ => Err(AuthError::Forbidden),
            },
        }
    }

    /// Authorize `identity` as the administrator
    pub fn admin(&self, identity: Identity) -> AuthResult<Administrator> {
        self.authorize(&identity, Role::Administrator)?;
        Ok(Administrator { identity })
    }
}

/// Extract the session token from the request's cookies
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a freshly issued token
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// `Set-Cookie` value clearing the session
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        SESSION_COOKIE
    )
}
