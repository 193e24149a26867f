//! # Participant Model
//!
//! Participants are rows of the `skaters` table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::ValidationError;

/// Sequential participant identity
pub type ParticipantId = i32;

/// Approval state of a participant row.
///
/// Rejection is not a state: a rejected participant is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalState {
    /// Registered, waiting for the administrator
    #[serde(rename = "revision")]
    Submitted,
    /// Approved by the administrator
    #[serde(rename = "aprobado")]
    Approved,
}

impl ApprovalState {
    /// Value stored in the `estado` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalState::Submitted => "revision",
            ApprovalState::Approved => "aprobado",
        }
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unknown `estado` value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown approval state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for ApprovalState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revision" => Ok(ApprovalState::Submitted),
            "aprobado" => Ok(ApprovalState::Approved),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// A participant as read from the store. The stored credential is never
/// part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub years_experience: i32,
    /// Stored photo filename under the uploads directory
    pub photo: String,
    pub state: ApprovalState,
    pub is_admin: bool,
}

/// Row to insert on registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
    /// Credential as produced by the configured verifier
    pub credential: String,
    pub specialty: String,
    pub years_experience: i32,
    pub photo: String,
    pub state: ApprovalState,
}

/// Self-edit changes. Identity and email are never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: String,
    pub specialty: String,
    pub years_experience: i32,
    /// Replacement photo filename, if one was uploaded
    pub photo: Option<String>,
}

/// Submitted registration form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "repeatPassword")]
    pub repeat_password: String,
    #[serde(rename = "especialidad")]
    pub specialty: String,
    #[serde(rename = "anos_experiencia")]
    pub years_experience: String,
}

/// Submitted profile edit form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "especialidad")]
    pub specialty: String,
    #[serde(rename = "anos_experiencia")]
    pub years_experience: String,
}

/// Submitted login form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Uploaded photo as received from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Parse the years-of-experience field
pub fn parse_years(raw: &str) -> Result<i32, ValidationError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|years| *years >= 0)
        .ok_or_else(|| ValidationError::InvalidField("anos_experiencia".to_string()))
}
