//! Participant HTTP Routes
//!
//! | Route | Access |
//! |---|---|
//! | `GET /`, `GET /login`, `GET /registrar`, `POST /register`, `POST /login`, `GET /logout` | anyone |
//! | `GET /perfil`, `GET /edit`, `POST /edit` | session |
//! | `GET /admin`, `GET/POST /approve/:id`, `GET/POST /delete/:id` | session + administrator |

use std::sync::Arc;

use axum::{
    extract::{Extension, Form, Multipart, Path, State},
    http::{
        header::{LOCATION, SET_COOKIE},
        StatusCode,
    },
    middleware::from_fn_with_state,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::HttpError;
use super::middleware::{require_admin, require_session};
use super::server::AppState;
use super::views;
use crate::auth::gate::{clear_session_cookie, session_cookie};
use crate::auth::{Administrator, Identity};
use crate::participants::model::{LoginForm, ProfileForm, RegistrationForm};
use crate::participants::{ParticipantId, PhotoUpload};

/// Name of the multipart field carrying the photo
const PHOTO_FIELD: &str = "foto";

/// All participant routes, gated per table above
pub fn participant_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/", get(home_handler))
        .route("/login", get(login_form_handler).post(login_handler))
        .route("/registrar", get(register_form_handler))
        .route("/register", post(register_handler))
        .route("/logout", get(logout_handler));

    let session = Router::new()
        .route("/perfil", get(profile_handler))
        .route("/edit", get(edit_form_handler).post(edit_handler))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let admin = Router::new()
        .route("/admin", get(admin_handler))
        .route("/approve/:id", get(approve_handler).post(approve_handler))
        .route("/delete/:id", get(delete_confirm_handler).post(delete_handler))
        .route_layer(from_fn_with_state(state, require_admin));

    public.merge(session).merge(admin)
}

/// 302 to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// 302 to `location`, setting a cookie on the way
fn found_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [(SET_COOKIE, cookie), (LOCATION, location.to_string())],
    )
        .into_response()
}

/// Split a multipart body into its text fields and an optional photo.
///
/// A photo part with no filename or no bytes counts as no photo, which is
/// what browsers send when the file input is left empty.
async fn read_multipart<T: DeserializeOwned>(
    mut multipart: Multipart,
) -> Result<(T, Option<PhotoUpload>), HttpError> {
    let mut fields = Map::new();
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == PHOTO_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| HttpError::bad_request(e.to_string()))?;

            if !file_name.is_empty() && !data.is_empty() {
                photo = Some(PhotoUpload {
                    file_name,
                    data: data.to_vec(),
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| HttpError::bad_request(e.to_string()))?;
            fields.insert(name, Value::String(text));
        }
    }

    let form = serde_json::from_value(Value::Object(fields))
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    Ok((form, photo))
}

// ==================
// Public
// ==================

async fn home_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, HttpError> {
    let participants = state
        .lifecycle
        .list_public()
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to load participants"))?;

    Ok(Html(views::home(&participants)))
}

async fn login_form_handler() -> Html<String> {
    Html(views::login_form())
}

async fn register_form_handler() -> Html<String> {
    Html(views::register_form())
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    let (form, photo) = read_multipart::<RegistrationForm>(multipart).await?;

    let registration = state
        .lifecycle
        .register(form, photo)
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to register participant"))?;

    Ok((
        [(SET_COOKIE, session_cookie(&registration.token))],
        Html(views::success()),
    )
        .into_response())
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, HttpError> {
    let login = state
        .lifecycle
        .login(form)
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to log in"))?;

    Ok(found_with_cookie(
        login.destination.path(),
        session_cookie(&login.token),
    ))
}

async fn logout_handler() -> Response {
    found_with_cookie("/", clear_session_cookie())
}

// ==================
// Session
// ==================

async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Html<String>, HttpError> {
    let participant = state
        .lifecycle
        .profile(&identity)
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to load profile"))?;

    Ok(Html(views::profile(&participant)))
}

async fn edit_form_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Html<String>, HttpError> {
    let participant = state
        .lifecycle
        .profile(&identity)
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to load edit view"))?;

    Ok(Html(views::edit_form(&participant)))
}

/// The row edited is always the session's; any `id` in the body is ignored
async fn edit_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    let (form, photo) = read_multipart::<ProfileForm>(multipart).await?;

    state
        .lifecycle
        .self_edit(&identity, form, photo)
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to update participant"))?;

    Ok(found("/"))
}

// ==================
// Administrator
// ==================

async fn admin_handler(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Administrator>,
) -> Result<Html<String>, HttpError> {
    let participants = state
        .lifecycle
        .list_for_admin(&admin)
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to load administrator view"))?;

    Ok(Html(views::admin(&participants)))
}

async fn approve_handler(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Administrator>,
    Path(id): Path<ParticipantId>,
) -> Result<Response, HttpError> {
    state
        .lifecycle
        .approve(&admin, id)
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to approve participant"))?;

    Ok(found("/admin"))
}

async fn delete_confirm_handler(
    Extension(_admin): Extension<Administrator>,
    Path(id): Path<ParticipantId>,
) -> Html<String> {
    Html(views::delete_confirm(id))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Administrator>,
    Path(id): Path<ParticipantId>,
) -> Result<Response, HttpError> {
    state
        .lifecycle
        .delete(&admin, id)
        .await
        .map_err(|e| HttpError::from_lifecycle(e, "Failed to delete participant"))?;

    Ok(found("/admin"))
}
