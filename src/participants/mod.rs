//! # Participants
//!
//! Participant model, registration and profile mutators, and the approval
//! state machine.

pub mod errors;
pub mod lifecycle;
pub mod model;

pub use errors::{LifecycleError, LifecycleResult, ValidationError};
pub use lifecycle::{
    Destination, LifecycleConfig, Login, ParticipantLifecycle, Registration, ResequenceMode,
};
pub use model::{ApprovalState, Participant, ParticipantId, PhotoUpload};
