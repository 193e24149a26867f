//! # In-Memory Participant Store
//!
//! Keeps rows and the identity counter behind one lock. Used by tests and
//! by `serve --in-memory`.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ParticipantStore, StoreError, StoreResult};
use crate::auth::CredentialVerifier;
use crate::participants::model::{
    ApprovalState, NewParticipant, Participant, ParticipantId, ProfileChanges,
};

#[derive(Debug, Clone)]
struct StoredRow {
    participant: Participant,
    credential: String,
}

#[derive(Debug)]
struct Table {
    rows: Vec<StoredRow>,
    next_id: ParticipantId,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

/// In-memory `skaters` table with a serial identity counter
#[derive(Debug, Default)]
pub struct InMemoryParticipantStore {
    table: Mutex<Table>,
}

impl InMemoryParticipantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the administrator row
    pub fn with_administrator(email: &str, credential: &str) -> Self {
        let store = Self::new();
        if let Ok(mut table) = store.table.lock() {
            let id = table.next_id;
            table.next_id += 1;
            table.rows.push(StoredRow {
                participant: Participant {
                    id,
                    name: "Administrador".to_string(),
                    email: email.to_string(),
                    specialty: String::new(),
                    years_experience: 0,
                    photo: String::new(),
                    state: ApprovalState::Approved,
                    is_admin: true,
                },
                credential: credential.to_string(),
            });
        }
        store
    }

    /// Number of rows, administrator included
    pub fn len(&self) -> usize {
        self.table.lock().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored credential for a row, for inspecting what the verifier wrote
    pub fn credential_of(&self, id: ParticipantId) -> Option<String> {
        let table = self.table.lock().ok()?;
        table
            .rows
            .iter()
            .find(|row| row.participant.id == id)
            .map(|row| row.credential.clone())
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Table>> {
        self.table.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait]
impl ParticipantStore for InMemoryParticipantStore {
    async fn find_public_participants(&self, admin_email: &str) -> StoreResult<Vec<Participant>> {
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .map(|row| &row.participant)
            .filter(|p| !p.is_admin && p.email != admin_email)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: ParticipantId) -> StoreResult<Option<Participant>> {
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .find(|row| row.participant.id == id)
            .map(|row| row.participant.clone()))
    }

    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
        verifier: &dyn CredentialVerifier,
    ) -> StoreResult<Option<Participant>> {
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .filter(|row| row.participant.email == email)
            .find(|row| verifier.verify(password, &row.credential))
            .map(|row| row.participant.clone()))
    }

    async fn insert(&self, new: &NewParticipant) -> StoreResult<Participant> {
        let mut table = self.lock()?;

        let id = table.next_id;
        if table.rows.iter().any(|row| row.participant.id == id) {
            return Err(StoreError::Database(format!(
                "duplicate key value violates unique constraint: id={}",
                id
            )));
        }
        table.next_id += 1;

        let participant = Participant {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            specialty: new.specialty.clone(),
            years_experience: new.years_experience,
            photo: new.photo.clone(),
            state: new.state,
            is_admin: false,
        };
        table.rows.push(StoredRow {
            participant: participant.clone(),
            credential: new.credential.clone(),
        });

        Ok(participant)
    }

    async fn update_profile(
        &self,
        id: ParticipantId,
        changes: &ProfileChanges,
    ) -> StoreResult<u64> {
        let mut table = self.lock()?;
        let mut affected = 0;
        for row in table.rows.iter_mut().filter(|row| row.participant.id == id) {
            row.participant.name = changes.name.clone();
            row.participant.specialty = changes.specialty.clone();
            row.participant.years_experience = changes.years_experience;
            if let Some(photo) = &changes.photo {
                row.participant.photo = photo.clone();
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn set_state(&self, id: ParticipantId, state: ApprovalState) -> StoreResult<u64> {
        let mut table = self.lock()?;
        let mut affected = 0;
        for row in table.rows.iter_mut().filter(|row| row.participant.id == id) {
            row.participant.state = state;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete(&self, id: ParticipantId) -> StoreResult<u64> {
        let mut table = self.lock()?;
        let before = table.rows.len();
        table.rows.retain(|row| row.participant.id != id);
        Ok((before - table.rows.len()) as u64)
    }

    async fn resequence(&self) -> StoreResult<ParticipantId> {
        let mut table = self.lock()?;
        let max = table.rows.iter().map(|row| row.participant.id).max();
        table.next_id = max.unwrap_or(0) + 1;
        Ok(table.next_id)
    }

    async fn delete_resequenced(&self, id: ParticipantId) -> StoreResult<ParticipantId> {
        let mut table = self.lock()?;
        table.rows.retain(|row| row.participant.id != id);
        let max = table.rows.iter().map(|row| row.participant.id).max();
        table.next_id = max.unwrap_or(0) + 1;
        Ok(table.next_id)
    }
}
