//! # Credential Verification
//!
//! The stored password column holds whatever a [`CredentialVerifier`]
//! produced when the participant registered. The default
//! [`PlaintextVerifier`] stores the password as-is and compares it in
//! constant time; [`Argon2Verifier`] stores Argon2id hashes instead.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use subtle::ConstantTimeEq;

use super::errors::{AuthError, AuthResult};

/// Turns a submitted password into its stored form and checks candidates
/// against it.
pub trait CredentialVerifier: Send + Sync {
    /// Stored representation of `password`
    fn seal(&self, password: &str) -> AuthResult<String>;

    /// Whether `password` matches the stored representation
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Comparable plaintext credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn seal(&self, password: &str) -> AuthResult<String> {
        Ok(password.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        constant_time_str_eq(password, stored)
    }
}

/// Argon2id password hashes
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
    fn seal(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::HashingFailed)
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(stored) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Constant-time comparison of two strings
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
