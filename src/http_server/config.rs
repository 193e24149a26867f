//! HTTP Server Configuration
//!
//! Bind address, content directories and upload limits.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where uploaded photos are written and served from
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// Static assets served for unmatched paths
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Largest accepted request body, photos included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("public").join("uploads")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            uploads_dir: default_uploads_dir(),
            public_dir: default_public_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
