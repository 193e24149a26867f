//! Shared harness for the HTTP integration tests
//!
//! Builds the full router over the in-memory store and a temporary uploads
//! directory, then drives it one request at a time.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use skatepark::auth::{AccessGate, PlaintextVerifier, SessionClaims, SessionCodec, TokenConfig};
use skatepark::http_server::{AppState, HttpServer, HttpServerConfig};
use skatepark::participants::{LifecycleConfig, ParticipantLifecycle, ResequenceMode};
use skatepark::store::{InMemoryParticipantStore, ParticipantStore};
use skatepark::uploads::LocalPhotoStore;

pub const SECRET: &str = "integration_secret";
pub const ADMIN_EMAIL: &str = "admin@skatepark.com";
pub const ADMIN_PASSWORD: &str = "admin_password";

const BOUNDARY: &str = "skateparkboundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryParticipantStore>,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mode(ResequenceMode::Separate)
    }

    pub fn with_mode(resequence: ResequenceMode) -> Self {
        let uploads = TempDir::new().unwrap();
        let store = Arc::new(InMemoryParticipantStore::with_administrator(
            ADMIN_EMAIL,
            ADMIN_PASSWORD,
        ));

        let router = router_over(
            store.clone(),
            LifecycleConfig {
                resequence,
                store_timeout: None,
            },
            uploads.path(),
        );

        Self {
            router,
            store,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        send_empty(&self.router, "GET", uri, token).await
    }

    pub async fn post_empty(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        send_empty(&self.router, "POST", uri, token).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response<Body> {
        let body = format!(
            "email={}&password={}",
            email.replace('@', "%40"),
            password
        );
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Log in and return the session token from the cookie
    pub async fn login_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        session_token(&response).unwrap()
    }

    pub async fn multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        photo: Option<(&str, &[u8])>,
        token: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("token={}", token));
        }
        self.send(builder.body(multipart_body(fields, photo)).unwrap())
            .await
    }

    /// Register a participant and return the session token
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .multipart(
                "/register",
                &registration_fields(name, email, password, password),
                Some(("board.png", &b"png-bytes"[..])),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_token(&response).unwrap()
    }
}

/// Full router over `store`, writing photos under `uploads`
pub fn router_over(
    store: Arc<dyn ParticipantStore>,
    lifecycle: LifecycleConfig,
    uploads: &Path,
) -> Router {
    let lifecycle = ParticipantLifecycle::new(
        store,
        Arc::new(LocalPhotoStore::new(uploads)),
        Arc::new(PlaintextVerifier),
        AccessGate::new(codec(), ADMIN_EMAIL),
        lifecycle,
    );

    let config = HttpServerConfig {
        uploads_dir: uploads.to_path_buf(),
        public_dir: uploads.join("public"),
        ..HttpServerConfig::default()
    };
    HttpServer::new(config, Arc::new(AppState::new(lifecycle))).router()
}

/// Bodyless request, with the session cookie when `token` is given
pub async fn send_empty(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={}", token));
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Token the gate accepts as the administrator, issued without a store
pub fn admin_token() -> String {
    codec()
        .issue(SessionClaims::for_login(1, ADMIN_EMAIL))
        .unwrap()
}

pub fn codec() -> SessionCodec {
    SessionCodec::new(TokenConfig::new(SECRET))
}

pub fn registration_fields<'a>(
    name: &'a str,
    email: &'a str,
    password: &'a str,
    repeat: &'a str,
) -> Vec<(&'a str, &'a str)> {
    vec![
        ("nombre", name),
        ("email", email),
        ("password", password),
        ("repeatPassword", repeat),
        ("especialidad", "Bowl"),
        ("anos_experiencia", "4"),
    ]
}

pub fn multipart_body(fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Body {
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((file_name, data)) = photo {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"foto\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    Body::from(body)
}

/// Value of the `token` cookie set by a response, if any
pub fn session_token(response: &Response<Body>) -> Option<String> {
    let cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let value = cookie.split(';').next()?.strip_prefix("token=")?;
    Some(value.to_string())
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
