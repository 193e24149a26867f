//! # Participant Lifecycle
//!
//! Governs a participant row from registration to approval or deletion:
//!
//! ```text
//! register ──► Submitted ──approve──► Approved ──┐
//!                  │          (idempotent)       │
//!                  └──────────delete─────────────┴──► Deleted (row removed)
//! ```
//!
//! Approval and deletion take an [`Administrator`], which only the access
//! gate can produce. Self-edit takes the session [`Identity`] and never a
//! client-supplied id.
//!
//! Deleting is followed by an explicit identity-sequence repair. In
//! [`ResequenceMode::Separate`] the two statements run back to back and a
//! concurrent insert can land between them; [`ResequenceMode::Transactional`]
//! asks the store to run both under a table lock.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::errors::{LifecycleError, LifecycleResult, ValidationError};
use super::model::{
    parse_years, ApprovalState, LoginForm, NewParticipant, Participant, ParticipantId,
    PhotoUpload, ProfileChanges, ProfileForm, RegistrationForm,
};
use crate::auth::{AccessGate, Administrator, AuthError, CredentialVerifier, Identity, SessionClaims};
use crate::observability::{log_event, Event};
use crate::store::{ParticipantStore, StoreResult};
use crate::uploads::PhotoStore;

/// How deletion repairs the identity sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResequenceMode {
    /// Delete, then resequence, as two independent statements
    #[default]
    Separate,
    /// Delete and resequence inside one locked transaction
    Transactional,
}

impl std::str::FromStr for ResequenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "separate" => Ok(ResequenceMode::Separate),
            "transactional" => Ok(ResequenceMode::Transactional),
            other => Err(format!("unknown resequence mode: {}", other)),
        }
    }
}

/// Lifecycle tuning
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleConfig {
    pub resequence: ResequenceMode,

    /// Bound on each store call; `None` waits indefinitely
    pub store_timeout: Option<Duration>,
}

/// Where a participant goes after logging in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Admin,
    Profile,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Admin => "/admin",
            Destination::Profile => "/perfil",
        }
    }
}

/// Outcome of a successful registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub participant: Participant,
    pub token: String,
}

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct Login {
    pub participant: Participant,
    pub token: String,
    pub destination: Destination,
}

/// The participant state machine and its mutators
pub struct ParticipantLifecycle {
    store: Arc<dyn ParticipantStore>,
    photos: Arc<dyn PhotoStore>,
    verifier: Arc<dyn CredentialVerifier>,
    gate: AccessGate,
    config: LifecycleConfig,
}

impl ParticipantLifecycle {
    pub fn new(
        store: Arc<dyn ParticipantStore>,
        photos: Arc<dyn PhotoStore>,
        verifier: Arc<dyn CredentialVerifier>,
        gate: AccessGate,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            photos,
            verifier,
            gate,
            config,
        }
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Run a store call under the configured timeout
    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> LifecycleResult<T> {
        let result = match self.config.store_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| LifecycleError::Timeout)?,
            None => call.await,
        };

        result.map_err(|e| {
            log_event(Event::StoreFailure, &[("error", e.to_string().as_str())]);
            LifecycleError::Store(e)
        })
    }

    /// Remove a photo whose row was never written. Failure is logged only.
    async fn discard_photo(&self, stored: &str) {
        if let Err(e) = self.photos.remove(stored).await {
            log_event(
                Event::StoreFailure,
                &[("error", e.to_string().as_str()), ("file", stored)],
            );
        }
    }

    /// Participants visible on the home page
    pub async fn list_public(&self) -> LifecycleResult<Vec<Participant>> {
        self.bounded(self.store.find_public_participants(self.gate.admin_email()))
            .await
    }

    /// Participants shown in the administrator view
    pub async fn list_for_admin(&self, _admin: &Administrator) -> LifecycleResult<Vec<Participant>> {
        self.bounded(self.store.find_public_participants(self.gate.admin_email()))
            .await
    }

    /// Create a `Submitted` participant and issue its session token
    pub async fn register(
        &self,
        form: RegistrationForm,
        photo: Option<PhotoUpload>,
    ) -> LifecycleResult<Registration> {
        if form.password != form.repeat_password {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if self.gate.is_reserved_email(&form.email) {
            log_event(Event::RegistrationRejected, &[("reason", "reserved_email")]);
            return Err(ValidationError::ReservedEmail.into());
        }
        let photo = photo.ok_or(ValidationError::MissingPhoto)?;
        let years_experience = parse_years(&form.years_experience)?;

        let credential = self.verifier.seal(&form.password)?;
        let stored_photo = self.photos.store(&photo.file_name, &photo.data).await?;
        log_event(Event::PhotoStored, &[("file", stored_photo.as_str())]);

        let inserted = self
            .bounded(self.store.insert(&NewParticipant {
                name: form.name,
                email: form.email,
                credential,
                specialty: form.specialty,
                years_experience,
                photo: stored_photo.clone(),
                state: ApprovalState::Submitted,
            }))
            .await;
        let participant = match inserted {
            Ok(participant) => participant,
            Err(e) => {
                self.discard_photo(&stored_photo).await;
                return Err(e);
            }
        };

        let token = self.gate.codec().issue(SessionClaims::for_id(participant.id))?;
        log_event(
            Event::ParticipantRegistered,
            &[("id", participant.id.to_string().as_str())],
        );

        Ok(Registration { participant, token })
    }

    /// Check credentials and issue a session token bound to id and email
    pub async fn login(&self, form: LoginForm) -> LifecycleResult<Login> {
        let found = self
            .bounded(
                self.store
                    .find_by_credentials(&form.email, &form.password, self.verifier.as_ref()),
            )
            .await?;

        let Some(participant) = found else {
            log_event(Event::LoginRejected, &[]);
            return Err(AuthError::InvalidCredentials.into());
        };

        let token = self
            .gate
            .codec()
            .issue(SessionClaims::for_login(participant.id, participant.email.clone()))?;

        let destination = if self.gate.is_admin_email(&form.email) {
            Destination::Admin
        } else {
            Destination::Profile
        };
        log_event(
            Event::LoginSucceeded,
            &[
                ("destination", destination.path()),
                ("id", participant.id.to_string().as_str()),
            ],
        );

        Ok(Login {
            participant,
            token,
            destination,
        })
    }

    /// `Submitted -> Approved`. Approving an approved (or missing) row is a
    /// no-op, not an error.
    pub async fn approve(&self, _admin: &Administrator, id: ParticipantId) -> LifecycleResult<()> {
        let affected = self
            .bounded(self.store.set_state(id, ApprovalState::Approved))
            .await?;

        log_event(
            Event::ParticipantApproved,
            &[("affected", affected.to_string().as_str()), ("id", id.to_string().as_str())],
        );
        Ok(())
    }

    /// `Submitted | Approved -> Deleted`, followed by the sequence repair.
    /// Returns the identity the next registration will receive.
    pub async fn delete(
        &self,
        _admin: &Administrator,
        id: ParticipantId,
    ) -> LifecycleResult<ParticipantId> {
        let next = match self.config.resequence {
            ResequenceMode::Separate => {
                let affected = self.bounded(self.store.delete(id)).await?;
                log_event(
                    Event::ParticipantDeleted,
                    &[("affected", affected.to_string().as_str()), ("id", id.to_string().as_str())],
                );
                self.bounded(self.store.resequence()).await?
            }
            ResequenceMode::Transactional => {
                let next = self.bounded(self.store.delete_resequenced(id)).await?;
                log_event(Event::ParticipantDeleted, &[("id", id.to_string().as_str())]);
                next
            }
        };

        log_event(Event::SequenceRepaired, &[("next_id", next.to_string().as_str())]);
        Ok(next)
    }

    /// The session participant's own row
    pub async fn profile(&self, identity: &Identity) -> LifecycleResult<Participant> {
        self.bounded(self.store.find_by_id(identity.id))
            .await?
            .ok_or(LifecycleError::NotFound)
    }

    /// Update the session participant's own name, specialty, experience
    /// and, when uploaded, photo. Approval state and email are untouched.
    pub async fn self_edit(
        &self,
        identity: &Identity,
        form: ProfileForm,
        photo: Option<PhotoUpload>,
    ) -> LifecycleResult<()> {
        let years_experience = parse_years(&form.years_experience)?;

        let photo = match photo {
            Some(upload) => {
                let stored = self.photos.store(&upload.file_name, &upload.data).await?;
                log_event(Event::PhotoStored, &[("file", stored.as_str())]);
                Some(stored)
            }
            None => None,
        };

        let changes = ProfileChanges {
            name: form.name,
            specialty: form.specialty,
            years_experience,
            photo,
        };
        let affected = match self
            .bounded(self.store.update_profile(identity.id, &changes))
            .await
        {
            Ok(affected) => affected,
            Err(e) => {
                if let Some(stored) = &changes.photo {
                    self.discard_photo(stored).await;
                }
                return Err(e);
            }
        };

        log_event(
            Event::ProfileUpdated,
            &[
                ("affected", affected.to_string().as_str()),
                ("id", identity.id.to_string().as_str()),
            ],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        Argon2Verifier, PlaintextVerifier, SessionCodec, TokenConfig, DEFAULT_ADMIN_EMAIL,
    };
    use crate::participants::model::NewParticipant;
    use crate::store::{InMemoryParticipantStore, StoreError};
    use crate::uploads::LocalPhotoStore;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        store: Arc<InMemoryParticipantStore>,
        lifecycle: ParticipantLifecycle,
    }

    fn fixture_with(config: LifecycleConfig) -> Fixture {
        fixture_full(config, Arc::new(PlaintextVerifier))
    }

    fn fixture_full(config: LifecycleConfig, verifier: Arc<dyn CredentialVerifier>) -> Fixture {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(InMemoryParticipantStore::with_administrator(
            DEFAULT_ADMIN_EMAIL,
            "admin",
        ));
        let gate = AccessGate::new(
            SessionCodec::new(TokenConfig::new("lifecycle_secret")),
            DEFAULT_ADMIN_EMAIL,
        );
        let lifecycle = ParticipantLifecycle::new(
            store.clone(),
            Arc::new(LocalPhotoStore::new(temp.path())),
            verifier,
            gate,
            config,
        );
        Fixture {
            temp,
            store,
            lifecycle,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(LifecycleConfig::default())
    }

    fn form(email: &str, password: &str, repeat: &str) -> RegistrationForm {
        RegistrationForm {
            name: "Skater".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            repeat_password: repeat.to_string(),
            specialty: "Bowl".to_string(),
            years_experience: "4".to_string(),
        }
    }

    fn photo() -> Option<PhotoUpload> {
        Some(PhotoUpload {
            file_name: "me.png".to_string(),
            data: vec![1, 2, 3],
        })
    }

    fn admin(f: &Fixture) -> Administrator {
        f.lifecycle
            .gate()
            .admin(Identity {
                id: 1,
                email: Some(DEFAULT_ADMIN_EMAIL.to_string()),
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_creates_submitted_row_and_token() {
        let f = fixture();
        let registration = f
            .lifecycle
            .register(form("a@x.com", "p", "p"), photo())
            .await
            .unwrap();

        assert_eq!(registration.participant.state, ApprovalState::Submitted);
        assert!(registration.participant.photo.ends_with("-me.png"));

        let claims = f.lifecycle.gate().codec().verify(&registration.token).unwrap();
        assert_eq!(claims.id, registration.participant.id);
        assert!(claims.email.is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_password_mismatch() {
        let f = fixture();
        let result = f.lifecycle.register(form("a@x.com", "p", "q"), photo()).await;

        assert!(matches!(
            result,
            Err(LifecycleError::Validation(ValidationError::PasswordMismatch))
        ));
        assert_eq!(f.store.len(), 1);
    }

    #[tokio::test]
    async fn test_register_requires_photo() {
        let f = fixture();
        let result = f.lifecycle.register(form("a@x.com", "p", "p"), None).await;

        assert!(matches!(
            result,
            Err(LifecycleError::Validation(ValidationError::MissingPhoto))
        ));
        assert_eq!(f.store.len(), 1);
    }

    #[tokio::test]
    async fn test_login_destinations() {
        let f = fixture();
        f.lifecycle
            .register(form("a@x.com", "p", "p"), photo())
            .await
            .unwrap();

        let skater = f
            .lifecycle
            .login(LoginForm {
                email: "a@x.com".to_string(),
                password: "p".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(skater.destination, Destination::Profile);

        let admin = f
            .lifecycle
            .login(LoginForm {
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                password: "admin".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(admin.destination, Destination::Admin);
        let claims = f.lifecycle.gate().codec().verify(&admin.token).unwrap();
        assert_eq!(claims.email.as_deref(), Some(DEFAULT_ADMIN_EMAIL));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let f = fixture();
        let result = f
            .lifecycle
            .login(LoginForm {
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                password: "nope".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(LifecycleError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_approve_is_idempotent() {
        let f = fixture();
        let admin = admin(&f);
        let id = f
            .lifecycle
            .register(form("a@x.com", "p", "p"), photo())
            .await
            .unwrap()
            .participant
            .id;

        f.lifecycle.approve(&admin, id).await.unwrap();
        f.lifecycle.approve(&admin, id).await.unwrap();

        let row = f.store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(row.state, ApprovalState::Approved);
    }

    #[tokio::test]
    async fn test_delete_then_register_reuses_next_identity() {
        for mode in [ResequenceMode::Separate, ResequenceMode::Transactional] {
            let f = fixture_with(LifecycleConfig {
                resequence: mode,
                store_timeout: None,
            });
            let admin = admin(&f);

            let a = f.lifecycle.register(form("a@x.com", "p", "p"), photo()).await.unwrap();
            let b = f.lifecycle.register(form("b@x.com", "p", "p"), photo()).await.unwrap();
            assert_eq!(b.participant.id, 3);

            let next = f.lifecycle.delete(&admin, b.participant.id).await.unwrap();
            assert_eq!(next, a.participant.id + 1);

            let c = f.lifecycle.register(form("c@x.com", "p", "p"), photo()).await.unwrap();
            assert_eq!(c.participant.id, 3);
        }
    }

    #[tokio::test]
    async fn test_self_edit_only_touches_session_row() {
        let f = fixture();
        let a = f.lifecycle.register(form("a@x.com", "p", "p"), photo()).await.unwrap();
        let b = f.lifecycle.register(form("b@x.com", "p", "p"), photo()).await.unwrap();

        let identity = Identity {
            id: a.participant.id,
            email: Some("a@x.com".to_string()),
        };
        f.lifecycle
            .self_edit(
                &identity,
                ProfileForm {
                    name: "Renamed".to_string(),
                    specialty: "Park".to_string(),
                    years_experience: "7".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        let edited = f.lifecycle.profile(&identity).await.unwrap();
        assert_eq!(edited.name, "Renamed");
        assert_eq!(edited.years_experience, 7);
        assert_eq!(edited.state, ApprovalState::Submitted);
        assert_eq!(edited.email, "a@x.com");
        assert_eq!(edited.photo, a.participant.photo);

        let untouched = f.store.find_by_id(b.participant.id).await.unwrap().unwrap();
        assert_eq!(untouched.name, "Skater");
    }

    #[tokio::test]
    async fn test_profile_of_deleted_row_is_not_found() {
        let f = fixture();
        let result = f
            .lifecycle
            .profile(&Identity {
                id: 42,
                email: None,
            })
            .await;

        assert!(matches!(result, Err(LifecycleError::NotFound)));
    }

    fn uploaded_files(temp: &TempDir) -> usize {
        std::fs::read_dir(temp.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_register_rejects_administrator_email() {
        let f = fixture();

        for email in [DEFAULT_ADMIN_EMAIL, " Admin@Skatepark.COM "] {
            let result = f.lifecycle.register(form(email, "mine", "mine"), photo()).await;
            assert!(matches!(
                result,
                Err(LifecycleError::Validation(ValidationError::ReservedEmail))
            ));
        }

        assert_eq!(f.store.len(), 1);
        assert_eq!(uploaded_files(&f.temp), 0);

        let impostor = f
            .lifecycle
            .login(LoginForm {
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                password: "mine".to_string(),
            })
            .await;
        assert!(matches!(
            impostor,
            Err(LifecycleError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_argon2_register_then_login() {
        let f = fixture_full(LifecycleConfig::default(), Arc::new(Argon2Verifier));
        let registration = f
            .lifecycle
            .register(form("a@x.com", "kickflip", "kickflip"), photo())
            .await
            .unwrap();

        let stored = f.store.credential_of(registration.participant.id).unwrap();
        assert!(stored.starts_with("$argon2"));
        assert_ne!(stored, "kickflip");

        let login = f
            .lifecycle
            .login(LoginForm {
                email: "a@x.com".to_string(),
                password: "kickflip".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.participant.id, registration.participant.id);
        assert_eq!(login.destination, Destination::Profile);

        let wrong = f
            .lifecycle
            .login(LoginForm {
                email: "a@x.com".to_string(),
                password: "heelflip".to_string(),
            })
            .await;
        assert!(matches!(
            wrong,
            Err(LifecycleError::Auth(AuthError::InvalidCredentials))
        ));
    }

    /// Store whose every write fails
    struct ReadOnlyStore;

    #[async_trait]
    impl ParticipantStore for ReadOnlyStore {
        async fn find_public_participants(&self, _: &str) -> StoreResult<Vec<Participant>> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _: ParticipantId) -> StoreResult<Option<Participant>> {
            Ok(None)
        }

        async fn find_by_credentials(
            &self,
            _: &str,
            _: &str,
            _: &dyn CredentialVerifier,
        ) -> StoreResult<Option<Participant>> {
            Ok(None)
        }

        async fn insert(&self, _: &NewParticipant) -> StoreResult<Participant> {
            Err(StoreError::Database("read only".to_string()))
        }

        async fn update_profile(&self, _: ParticipantId, _: &ProfileChanges) -> StoreResult<u64> {
            Err(StoreError::Database("read only".to_string()))
        }

        async fn set_state(&self, _: ParticipantId, _: ApprovalState) -> StoreResult<u64> {
            Err(StoreError::Database("read only".to_string()))
        }

        async fn delete(&self, _: ParticipantId) -> StoreResult<u64> {
            Err(StoreError::Database("read only".to_string()))
        }

        async fn resequence(&self) -> StoreResult<ParticipantId> {
            Err(StoreError::Database("read only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_discards_uploaded_photo() {
        let temp = TempDir::new().unwrap();
        let lifecycle = ParticipantLifecycle::new(
            Arc::new(ReadOnlyStore),
            Arc::new(LocalPhotoStore::new(temp.path())),
            Arc::new(PlaintextVerifier),
            AccessGate::new(
                SessionCodec::new(TokenConfig::new("lifecycle_secret")),
                DEFAULT_ADMIN_EMAIL,
            ),
            LifecycleConfig::default(),
        );

        let result = lifecycle.register(form("a@x.com", "p", "p"), photo()).await;
        assert!(matches!(result, Err(LifecycleError::Store(_))));
        assert_eq!(uploaded_files(&temp), 0);

        let identity = Identity { id: 2, email: None };
        let profile = ProfileForm {
            name: "Renamed".to_string(),
            specialty: "Park".to_string(),
            years_experience: "7".to_string(),
        };
        let result = lifecycle.self_edit(&identity, profile, photo()).await;
        assert!(matches!(result, Err(LifecycleError::Store(_))));
        assert_eq!(uploaded_files(&temp), 0);
    }

    #[test]
    fn test_resequence_mode_parsing() {
        assert_eq!("separate".parse(), Ok(ResequenceMode::Separate));
        assert_eq!("Transactional".parse(), Ok(ResequenceMode::Transactional));
        assert!("atomic".parse::<ResequenceMode>().is_err());
    }
}
