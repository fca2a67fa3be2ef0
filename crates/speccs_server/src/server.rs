//! Server bootstrap with graceful shutdown on SIGTERM/Ctrl+C.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

use log::{info, warn};
use speccs_core::{init_logging, open_database_url, DbError};
use tokio::net::TcpListener;

use crate::config::{ConfigError, ServerConfig};
use crate::routes;
use crate::state::AppState;

#[derive(Debug)]
pub enum ServerError {
    Config(ConfigError),
    Logging(String),
    Database(DbError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Database(err) => write!(f, "database setup failed: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
            Self::Database(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ServerError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Database(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Starts logging, opens the database and serves until shutdown.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    init_logging(&config.log_level, config.log_dir.as_deref()).map_err(ServerError::Logging)?;
    let conn = open_database_url(&config.database_url)?;
    serve(AppState::new(conn), config.bind_addr).await
}

/// Serves the router on `bind_addr`.
pub async fn serve(state: AppState, bind_addr: SocketAddr) -> Result<(), ServerError> {
    let app = routes::router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    info!("event=server_listen module=server status=ok addr={bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_shutdown module=server status=ok");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("event=signal_install module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("event=shutdown_signal module=server status=ok signal=ctrl_c");
        }
        _ = terminate => {
            info!("event=shutdown_signal module=server status=ok signal=sigterm");
        }
    }
}
