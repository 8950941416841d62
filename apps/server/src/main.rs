//! WPBridge gateway server binary
//!
//! Configuration comes from `WPBRIDGE_*` environment variables (see
//! `GatewayConfig`). Logs go to the console and to a daily rolling file.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wpbridge_core::{branding, CredentialStore};
use wpbridge_gateway::{GatewayConfig, GatewayServer, SignedSessionCookieResolver};
use wpbridge_storage::{
    parse_master_key, Database, FieldEncryptor, MemoryCredentialStore, SqliteCredentialStore,
};

fn init_tracing(logs_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create logs directory {}", logs_dir.display()))?;

    // Files like: wpbridge.2026-01-22.log
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(branding::LOG_PREFIX)
        .filename_suffix("log")
        .build(logs_dir)
        .context("Failed to create log file appender")?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG takes precedence
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(
            "info,wpbridge_core=debug,wpbridge_gateway=debug,wpbridge_storage=debug,wpbridge_mcp=debug,wpbridge_server=debug",
        )?,
    };

    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Sealed SQLite store when a database path is configured, memory otherwise.
fn build_store(config: &GatewayConfig) -> Result<Arc<dyn CredentialStore>> {
    let Some(path) = &config.database_path else {
        info!("[Server] Using in-memory credential store; credentials are lost on restart");
        return Ok(Arc::new(MemoryCredentialStore::new()));
    };

    let Some(master_key) = &config.master_key else {
        bail!("WPBRIDGE_MASTER_KEY is required when WPBRIDGE_DATABASE_PATH is set");
    };
    let key = parse_master_key(master_key).context("Invalid WPBRIDGE_MASTER_KEY")?;
    let encryptor = FieldEncryptor::new(&key)?;

    let db = Database::open(path)?;
    info!(
        "[Server] Using SQLite credential store at {} (schema v{})",
        path.display(),
        db.schema_version()
    );

    Ok(Arc::new(SqliteCredentialStore::new(
        Arc::new(Mutex::new(db)),
        Arc::new(encryptor),
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env()?;
    let _log_guard = init_tracing(&config.log_dir)?;

    info!("{} gateway v{}", branding::DISPLAY_NAME, env!("CARGO_PKG_VERSION"));

    let Some(secret) = config.session_secret.clone() else {
        bail!("WPBRIDGE_SESSION_SECRET is required");
    };
    let resolver = Arc::new(SignedSessionCookieResolver::new(
        config.session_cookie_name.clone(),
        &secret,
    ));
    let store = build_store(&config)?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("[Server] Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("[Server] Shutdown requested");
        signal.cancel();
    });

    GatewayServer::new(config, store, resolver).run(shutdown).await
}
