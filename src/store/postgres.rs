//! # PostgreSQL Participant Store
//!
//! `sqlx` pool over the `skaters` table. The pool is bounded by
//! `max_connections`; callers beyond the bound wait for a connection.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

use super::{ParticipantStore, StoreError, StoreResult};
use crate::auth::CredentialVerifier;
use crate::participants::model::{
    ApprovalState, NewParticipant, Participant, ParticipantId, ProfileChanges,
};

const SELECT_COLUMNS: &str =
    "SELECT id, nombre, email, password, especialidad, anos_experiencia, foto, estado, is_admin FROM skaters";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS skaters (
    id SERIAL PRIMARY KEY,
    nombre VARCHAR(255) NOT NULL DEFAULT '',
    email VARCHAR(255) NOT NULL,
    password VARCHAR(255) NOT NULL,
    especialidad VARCHAR(255) NOT NULL DEFAULT '',
    anos_experiencia INTEGER NOT NULL DEFAULT 0,
    foto VARCHAR(255) NOT NULL DEFAULT '',
    estado VARCHAR(50) NOT NULL DEFAULT 'revision',
    is_admin BOOLEAN NOT NULL DEFAULT FALSE
)";

const RESEQUENCE: &str = "SELECT setval(pg_get_serial_sequence('skaters', 'id'), coalesce(max(id), 0) + 1, false) FROM skaters";

/// Connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,

    /// Pool bound
    pub max_connections: u32,

    /// How long a request may wait for a pooled connection; `None` waits
    /// indefinitely
    pub acquire_timeout: Option<Duration>,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout: None,
        }
    }

    /// Acquisition bound handed to the pool. A year stands in for
    /// "never time out" when none is configured.
    pub fn effective_acquire_timeout(&self) -> Duration {
        self.acquire_timeout
            .unwrap_or(Duration::from_secs(365 * 24 * 60 * 60))
    }
}

#[derive(Debug, FromRow)]
struct SkaterRow {
    id: i32,
    nombre: String,
    email: String,
    password: String,
    especialidad: String,
    anos_experiencia: i32,
    foto: String,
    estado: String,
    is_admin: bool,
}

impl TryFrom<SkaterRow> for Participant {
    type Error = StoreError;

    fn try_from(row: SkaterRow) -> Result<Self, Self::Error> {
        let state = row
            .estado
            .parse::<ApprovalState>()
            .map_err(|e| StoreError::CorruptRow(format!("id {}: {}", row.id, e)))?;

        Ok(Participant {
            id: row.id,
            name: row.nombre,
            email: row.email,
            specialty: row.especialidad,
            years_experience: row.anos_experiencia,
            photo: row.foto,
            state,
            is_admin: row.is_admin,
        })
    }
}

/// `skaters` table behind a bounded `PgPool`
#[derive(Debug, Clone)]
pub struct PgParticipantStore {
    pool: PgPool,
}

impl PgParticipantStore {
    /// Open the pool
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.effective_acquire_timeout())
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the table and the administrator row if they do not exist
    pub async fn migrate(&self, admin_email: &str, admin_credential: &str) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;

        sqlx::query(
            "INSERT INTO skaters (nombre, email, password, especialidad, anos_experiencia, foto, estado, is_admin)
             SELECT 'Administrador', $1, $2, '', 0, '', 'aprobado', TRUE
             WHERE NOT EXISTS (SELECT 1 FROM skaters WHERE is_admin = TRUE)",
        )
        .bind(admin_email)
        .bind(admin_credential)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ParticipantStore for PgParticipantStore {
    async fn find_public_participants(&self, admin_email: &str) -> StoreResult<Vec<Participant>> {
        let rows = sqlx::query_as::<_, SkaterRow>(&format!(
            "{} WHERE is_admin = FALSE AND email != $1 ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(admin_email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Participant::try_from).collect()
    }

    async fn find_by_id(&self, id: ParticipantId) -> StoreResult<Option<Participant>> {
        let row = sqlx::query_as::<_, SkaterRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Participant::try_from).transpose()
    }

    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
        verifier: &dyn CredentialVerifier,
    ) -> StoreResult<Option<Participant>> {
        let rows = sqlx::query_as::<_, SkaterRow>(&format!(
            "{} WHERE email = $1 ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .find(|row| verifier.verify(password, &row.password))
            .map(Participant::try_from)
            .transpose()
    }

    async fn insert(&self, new: &NewParticipant) -> StoreResult<Participant> {
        let row = sqlx::query_as::<_, SkaterRow>(
            "INSERT INTO skaters (nombre, email, password, especialidad, anos_experiencia, foto, estado)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, nombre, email, password, especialidad, anos_experiencia, foto, estado, is_admin",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.credential)
        .bind(&new.specialty)
        .bind(new.years_experience)
        .bind(&new.photo)
        .bind(new.state.as_str())
        .fetch_one(&self.pool)
        .await?;

        Participant::try_from(row)
    }

    async fn update_profile(
        &self,
        id: ParticipantId,
        changes: &ProfileChanges,
    ) -> StoreResult<u64> {
        let result = match &changes.photo {
            Some(photo) => {
                sqlx::query(
                    "UPDATE skaters SET nombre = $1, especialidad = $2, anos_experiencia = $3, foto = $4 WHERE id = $5",
                )
                .bind(&changes.name)
                .bind(&changes.specialty)
                .bind(changes.years_experience)
                .bind(photo)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE skaters SET nombre = $1, especialidad = $2, anos_experiencia = $3 WHERE id = $4",
                )
                .bind(&changes.name)
                .bind(&changes.specialty)
                .bind(changes.years_experience)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn set_state(&self, id: ParticipantId, state: ApprovalState) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE skaters SET estado = $1 WHERE id = $2")
            .bind(state.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: ParticipantId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM skaters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn resequence(&self) -> StoreResult<ParticipantId> {
        let next: i64 = sqlx::query_scalar(RESEQUENCE)
            .fetch_one(&self.pool)
            .await?;

        ParticipantId::try_from(next)
            .map_err(|_| StoreError::CorruptRow(format!("sequence value {} out of range", next)))
    }

    async fn delete_resequenced(&self, id: ParticipantId) -> StoreResult<ParticipantId> {
        let mut tx = self.pool.begin().await?;

        // Blocks concurrent inserts until the sequence is repaired
        sqlx::query("LOCK TABLE skaters IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM skaters WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let next: i64 = sqlx::query_scalar(RESEQUENCE).fetch_one(&mut *tx).await?;

        tx.commit().await?;

        ParticipantId::try_from(next)
            .map_err(|_| StoreError::CorruptRow(format!("sequence value {} out of range", next)))
    }
}
