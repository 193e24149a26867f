//! skatepark - Registration and approval site for skatepark participants
//!
//! Participants register with a photo, log in, and edit their own profile.
//! The administrator reviews submissions, approves them, and deletes rows.

pub mod auth;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod observability;
pub mod participants;
pub mod store;
pub mod uploads;
