//! # Photo Uploads
//!
//! Receives a participant photo and a desired name, stores it, and
//! returns the stored filename. Stored names are prefixed with the upload
//! time in milliseconds. Files are created exclusively; when the name is
//! taken the prefix is bumped, so an existing photo is never overwritten.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Prefix bumps tried before giving up on a free name
const MAX_NAME_ATTEMPTS: i64 = 1000;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Upload failures
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("No free file name for {0}")]
    NameExhausted(String),
}

impl From<std::io::Error> for UploadError {
    fn from(e: std::io::Error) -> Self {
        UploadError::IoError(e.to_string())
    }
}

/// Destination for uploaded photos
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store `data` and return the stored filename
    async fn store(&self, desired_name: &str, data: &[u8]) -> UploadResult<String>;

    /// Remove a previously stored file. Removing a missing file succeeds.
    async fn remove(&self, stored_name: &str) -> UploadResult<()>;
}

/// Photos written under a local directory
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    root: PathBuf,
}

impl LocalPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory if needed
    pub async fn ensure_dir(&self) -> UploadResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn store(&self, desired_name: &str, data: &[u8]) -> UploadResult<String> {
        self.ensure_dir().await?;

        let millis = Utc::now().timestamp_millis();
        for bump in 0..MAX_NAME_ATTEMPTS {
            let file_name = stored_name(millis + bump, desired_name);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&file_name))
                .await;

            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(data).await?;
            file.flush().await?;

            return Ok(file_name);
        }

        Err(UploadError::NameExhausted(sanitize_file_name(desired_name)))
    }

    async fn remove(&self, stored_name: &str) -> UploadResult<()> {
        match tokio::fs::remove_file(self.root.join(sanitize_file_name(stored_name))).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// `<millis>-<sanitized name>`
pub fn stored_name(millis: i64, desired_name: &str) -> String {
    format!("{}-{}", millis, sanitize_file_name(desired_name))
}

/// Reduce a client-supplied name to a single safe path component
pub fn sanitize_file_name(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

    // Keep only the last component of whatever path the client sent
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = unsafe_chars.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "foto".to_string()
    } else {
        cleaned.to_string()
    }
}
