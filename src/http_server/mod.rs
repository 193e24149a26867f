//! # Skatepark HTTP Server Module
//!
//! Axum server for participant registration, login, profiles and the
//! administrator approval view.
//!
//! # Endpoints
//!
//! - `/`, `/login`, `/registrar`, `/register`, `/logout` - public
//! - `/perfil`, `/edit` - own profile (session required)
//! - `/admin`, `/approve/:id`, `/delete/:id` - administrator only
//! - `/uploads/*` - participant photos

pub mod config;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod views;

pub use config::HttpServerConfig;
pub use errors::HttpError;
pub use server::{AppState, HttpServer};
