//! # Skatepark Auth Module
//!
//! Session tokens, the access control gate, and the credential
//! verification capability.

pub mod credentials;
pub mod errors;
pub mod gate;
pub mod token;

pub use credentials::{Argon2Verifier, CredentialVerifier, PlaintextVerifier};
pub use errors::{AuthError, AuthResult};
pub use gate::{AccessGate, Administrator, Identity, Role, DEFAULT_ADMIN_EMAIL};
pub use token::{SessionClaims, SessionCodec, TokenConfig, SESSION_COOKIE};
