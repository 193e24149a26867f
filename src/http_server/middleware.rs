//! Access Control Middleware
//!
//! Route layers that run the access gate before any handler (and before
//! any query). On success the caller's [`Identity`] is placed in request
//! extensions, along with the [`Administrator`] proof on privileged routes.
//!
//! [`Identity`]: crate::auth::Identity
//! [`Administrator`]: crate::auth::Administrator

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::errors::HttpError;
use super::server::AppState;

/// Require a valid session
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.lifecycle.gate().authenticate(request.headers()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => HttpError::from_auth(e).into_response(),
    }
}

/// Require a valid session belonging to the administrator
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let gate = state.lifecycle.gate();

    let admin = gate
        .authenticate(request.headers())
        .and_then(|identity| gate.admin(identity));

    match admin {
        Ok(admin) => {
            request.extensions_mut().insert(admin.identity().clone());
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(e) => HttpError::from_auth(e).into_response(),
    }
}
