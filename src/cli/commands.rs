//! CLI command implementations
//!
//! Configuration is loaded exactly once, here, and passed down into every
//! component as it is built.

use std::sync::Arc;

use crate::auth::{AccessGate, SessionCodec, TokenConfig};
use crate::config::{AppConfig, ConfigError};
use crate::http_server::{AppState, HttpServer};
use crate::observability::{init_logging, log_event, Event};
use crate::participants::ParticipantLifecycle;
use crate::store::{InMemoryParticipantStore, ParticipantStore, PgParticipantStore};
use crate::uploads::LocalPhotoStore;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments, load configuration, and run the chosen command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging();
    let config = AppConfig::from_env()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_command(cli.command, config))
}

/// Dispatch a parsed command
pub async fn run_command(command: Command, mut config: AppConfig) -> CliResult<()> {
    match command {
        Command::Serve {
            host,
            port,
            in_memory,
        } => {
            apply_overrides(&mut config, host, port);
            serve(config, in_memory).await
        }
        Command::Migrate => migrate(&config).await,
    }
}

fn apply_overrides(config: &mut AppConfig, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}

/// Build every component from `config` and serve until the process exits
pub async fn serve(config: AppConfig, in_memory: bool) -> CliResult<()> {
    log_event(
        Event::ServerStarting,
        &[
            ("addr", config.server.socket_addr().as_str()),
            ("in_memory", if in_memory { "true" } else { "false" }),
        ],
    );

    let mut token_config = TokenConfig::new(config.require_secret()?);
    if let Some(ttl) = config.token_ttl {
        token_config = token_config.with_ttl(ttl);
    }
    let gate = AccessGate::new(SessionCodec::new(token_config), config.admin_email.clone());
    let verifier = config.credentials.verifier();

    let store: Arc<dyn ParticipantStore> = if in_memory {
        let password = config
            .admin_password
            .as_deref()
            .ok_or(ConfigError::Missing("ADMIN_PASSWORD"))?;
        let credential = verifier
            .seal(password)
            .map_err(|e| CliError::config_error(e.to_string()))?;
        Arc::new(InMemoryParticipantStore::with_administrator(
            &config.admin_email,
            &credential,
        ))
    } else {
        Arc::new(PgParticipantStore::connect(config.require_database()?).await?)
    };

    let photos = LocalPhotoStore::new(config.server.uploads_dir.clone());
    photos.ensure_dir().await?;

    let lifecycle = ParticipantLifecycle::new(
        store,
        Arc::new(photos),
        verifier,
        gate,
        config.lifecycle,
    );
    let state = Arc::new(AppState::new(lifecycle));

    HttpServer::new(config.server.clone(), state).start().await?;
    Ok(())
}

/// Create the `skaters` table and seed the administrator
pub async fn migrate(config: &AppConfig) -> CliResult<()> {
    let password = config
        .admin_password
        .as_deref()
        .ok_or(ConfigError::Missing("ADMIN_PASSWORD"))?;
    let credential = config
        .credentials
        .verifier()
        .seal(password)
        .map_err(|e| CliError::config_error(e.to_string()))?;

    let store = PgParticipantStore::connect(config.require_database()?).await?;
    store.migrate(&config.admin_email, &credential).await?;

    log_event(
        Event::SchemaMigrated,
        &[("admin_email", config.admin_email.as_str())],
    );
    Ok(())
}
