//! Observability for the skatepark service
//!
//! Structured JSON logging over the `log` facade and the typed events the
//! service emits.
//!
//! # Usage
//!
//! ```ignore
//! use skatepark::observability::{init_logging, log_event, Event};
//!
//! init_logging();
//! log_event(Event::ParticipantApproved, &[("id", "4")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{format_record, init_logging, log_event, render_event, TARGET};
