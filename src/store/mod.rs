//! # Participant Store
//!
//! Data access for the `skaters` table. Adapters carry no business
//! rules: the lifecycle decides which calls are legal, the store only
//! executes them. Every statement is parameterized.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::CredentialVerifier;
use crate::participants::model::{
    ApprovalState, NewParticipant, Participant, ParticipantId, ProfileChanges,
};

pub use memory::InMemoryParticipantStore;
pub use postgres::{DatabaseConfig, PgParticipantStore};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Data-access failures
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Query or connection failure reported by the database
    #[error("Database error: {0}")]
    Database(String),

    /// A row could not be mapped into a participant
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// In-process lock poisoned
    #[error("Lock poisoned")]
    LockPoisoned,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Parameterized data access for participant rows
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// All rows that are neither flagged admin nor carry the admin email
    async fn find_public_participants(&self, admin_email: &str) -> StoreResult<Vec<Participant>>;

    /// Row by identity
    async fn find_by_id(&self, id: ParticipantId) -> StoreResult<Option<Participant>>;

    /// First row with `email` whose stored credential accepts `password`
    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
        verifier: &dyn CredentialVerifier,
    ) -> StoreResult<Option<Participant>>;

    /// Insert a row, returning it with its assigned identity
    async fn insert(&self, participant: &NewParticipant) -> StoreResult<Participant>;

    /// Apply self-edit changes; returns affected row count
    async fn update_profile(&self, id: ParticipantId, changes: &ProfileChanges)
        -> StoreResult<u64>;

    /// Set the approval state; returns affected row count
    async fn set_state(&self, id: ParticipantId, state: ApprovalState) -> StoreResult<u64>;

    /// Remove a row; returns affected row count
    async fn delete(&self, id: ParticipantId) -> StoreResult<u64>;

    /// Reset the identity sequence to `max(id) + 1`, or 1 when empty.
    /// Returns the identity the next insert will receive.
    async fn resequence(&self) -> StoreResult<ParticipantId>;

    /// Delete and resequence as one isolated unit.
    ///
    /// The default runs the two steps back to back with no isolation;
    /// adapters that can lock the table override it.
    async fn delete_resequenced(&self, id: ParticipantId) -> StoreResult<ParticipantId> {
        self.delete(id).await?;
        self.resequence().await
    }
}
