//! Observable events for the skatepark service
//!
//! Events are explicit and typed; every log line names one.

use std::fmt;

use log::Level;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded, components being built
    ServerStarting,
    /// Listening for requests
    Serving,
    /// Schema bootstrap finished
    SchemaMigrated,

    // Participants
    ParticipantRegistered,
    /// Registration refused before anything was stored
    RegistrationRejected,
    ParticipantApproved,
    ParticipantDeleted,
    /// Identity sequence reset after a deletion
    SequenceRepaired,
    ProfileUpdated,
    PhotoStored,

    // Sessions
    LoginSucceeded,
    LoginRejected,
    /// Session cookie present but failed verification
    AuthenticationFailed,
    /// Valid session without the required role
    AccessDenied,

    // Failures
    /// A store call failed
    StoreFailure,
    /// A request ended in a server error
    RequestFailed,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ServerStarting => "SERVER_STARTING",
            Event::Serving => "SERVING",
            Event::SchemaMigrated => "SCHEMA_MIGRATED",
            Event::ParticipantRegistered => "PARTICIPANT_REGISTERED",
            Event::RegistrationRejected => "REGISTRATION_REJECTED",
            Event::ParticipantApproved => "PARTICIPANT_APPROVED",
            Event::ParticipantDeleted => "PARTICIPANT_DELETED",
            Event::SequenceRepaired => "SEQUENCE_REPAIRED",
            Event::ProfileUpdated => "PROFILE_UPDATED",
            Event::PhotoStored => "PHOTO_STORED",
            Event::LoginSucceeded => "LOGIN_SUCCEEDED",
            Event::LoginRejected => "LOGIN_REJECTED",
            Event::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Event::AccessDenied => "ACCESS_DENIED",
            Event::StoreFailure => "STORE_FAILURE",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Level the event is logged at
    pub fn level(&self) -> Level {
        match self {
            Event::StoreFailure | Event::AuthenticationFailed | Event::RequestFailed => Level::Error,
            Event::LoginRejected | Event::AccessDenied | Event::RegistrationRejected => {
                Level::Warn
            }
            Event::PhotoStored => Level::Debug,
            _ => Level::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
