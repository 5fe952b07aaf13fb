//! HTTP server for hotpage.
//!
//! Serves the index template and, when live reload is enabled, a WebSocket
//! endpoint that receives freshly rendered templates whenever a file under
//! the template root changes.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use hotpage_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root: PathBuf::from("www"),
//!         live_reload_enabled: true,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (hotpage-server)
//!                        │
//!                        ├─► GET /  ──► TemplateSet snapshot ──► index template
//!                        │
//!                        └─► WebSocket ──► ConnectionRegistry
//!                                              ▲
//!                     notify ──► WatchLoop ──► ReloadPipeline
//! ```

mod app;
mod error;
mod handlers;
pub mod live_reload;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use hotpage_source::{FsSource, TemplateSource};
use hotpage_templates::{CompiledTemplates, DEFAULT_PATTERNS, TemplatePatterns, TemplateSet};
use live_reload::FatalError;
use state::AppState;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Template root directory.
    pub root: PathBuf,
    /// Glob patterns selecting template files.
    pub patterns: Vec<String>,
    /// Template rendered at `/`.
    pub index: String,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Path of the live reload WebSocket.
    pub live_reload_endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            root: PathBuf::from("www"),
            patterns: DEFAULT_PATTERNS.iter().map(|&p| p.to_owned()).collect(),
            index: "index.html".to_owned(),
            live_reload_enabled: false,
            live_reload_endpoint: "/hotreload".to_owned(),
        }
    }
}

/// Run the server.
///
/// Serves until Ctrl-C, or until live reload hits a fatal error, which is
/// then returned after the server has shut down.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the templates cannot be compiled, the root cannot be
/// watched, the listener cannot be bound, or live reload fails at runtime.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let root = config
        .root
        .canonicalize()
        .map_err(|source| ServerError::Root {
            path: config.root.clone(),
            source,
        })?;
    let source: Arc<dyn TemplateSource> = Arc::new(FsSource::new(root));
    let patterns = TemplatePatterns::new(&config.patterns)?;

    let initial = CompiledTemplates::compile(source.as_ref(), &patterns)?;
    tracing::info!(
        root = %source.root().display(),
        count = initial.names().len(),
        "Templates compiled"
    );
    let templates = Arc::new(TemplateSet::new(initial));

    // Runtime live reload failures stop the server
    let (fatal_tx, fatal_rx) = mpsc::channel(1);
    let live_reload = if config.live_reload_enabled {
        Some(live_reload::LiveReload::start(
            Arc::clone(&source),
            Arc::clone(&templates),
            patterns,
            fatal_tx,
        )?)
    } else {
        None
    };

    let state = Arc::new(AppState {
        templates,
        index: config.index.clone(),
        live_reload,
        live_reload_endpoint: config.live_reload_endpoint.clone(),
    });
    let app = app::create_router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    serve(listener, app, fatal_rx, shutdown_signal()).await
}

/// Serve `app` until `signal` completes or a live reload fatal error arrives.
///
/// A closed fatal channel (live reload disabled or finished without error)
/// does not stop the server.
async fn serve(
    listener: TcpListener,
    app: Router,
    mut fatal_rx: mpsc::Receiver<FatalError>,
    signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let (fatal_slot_tx, mut fatal_slot_rx) = oneshot::channel();
    let shutdown = async move {
        tokio::select! {
            () = signal => {}
            Some(fatal) = fatal_rx.recv() => {
                tracing::error!(error = %fatal, "Stopping server");
                let _ = fatal_slot_tx.send(fatal);
            }
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    match fatal_slot_rx.try_recv() {
        Ok(fatal) => Err(fatal.into()),
        Err(_) => Ok(()),
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from hotpage config.
///
/// # Arguments
///
/// * `config` - Loaded hotpage configuration
#[must_use]
pub fn server_config_from_config(config: &hotpage_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.templates_resolved.root.clone(),
        patterns: config.templates_resolved.patterns.clone(),
        index: config.templates_resolved.index.clone(),
        live_reload_enabled: config.live_reload.enabled,
        live_reload_endpoint: config.live_reload.endpoint.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hotpage_config::{CliSettings, Config};
    use pretty_assertions::assert_eq;
    use tokio::time::timeout;

    use super::*;

    #[test]
    fn test_server_config_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("hotpage.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
port = 9000

[templates]
root = "site"
index = "home.html"

[live_reload]
endpoint = "/reload"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&config_path), Some(&CliSettings::default())).unwrap();
        let server_config = server_config_from_config(&config);

        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.port, 9000);
        assert_eq!(server_config.root, dir.path().join("site"));
        assert_eq!(server_config.index, "home.html");
        assert_eq!(server_config.patterns, vec!["*.html", "**/*.html"]);
        assert!(server_config.live_reload_enabled);
        assert_eq!(server_config.live_reload_endpoint, "/reload");
    }

    async fn local_listener() -> TcpListener {
        TcpListener::bind(("127.0.0.1", 0)).await.unwrap()
    }

    #[tokio::test]
    async fn test_serve_returns_fatal_error() {
        let (fatal_tx, fatal_rx) = mpsc::channel(1);
        fatal_tx.send(FatalError::WatcherClosed).await.unwrap();

        let result = timeout(
            Duration::from_secs(5),
            serve(local_listener().await, Router::new(), fatal_rx, std::future::pending()),
        )
        .await
        .unwrap();

        assert!(matches!(
            result,
            Err(ServerError::Fatal(FatalError::WatcherClosed))
        ));
    }

    #[tokio::test]
    async fn test_serve_stops_cleanly_on_signal() {
        let (_fatal_tx, fatal_rx) = mpsc::channel(1);

        let result = timeout(
            Duration::from_secs(5),
            serve(local_listener().await, Router::new(), fatal_rx, async {}),
        )
        .await
        .unwrap();

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_serve_keeps_running_without_live_reload() {
        let (fatal_tx, fatal_rx) = mpsc::channel(1);
        drop(fatal_tx);

        let result = timeout(
            Duration::from_millis(200),
            serve(local_listener().await, Router::new(), fatal_rx, std::future::pending()),
        )
        .await;

        assert!(result.is_err(), "server stopped on a closed fatal channel");
    }

    #[tokio::test]
    async fn test_run_server_fails_on_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            root: dir.path().join("missing"),
            port: 0,
            ..ServerConfig::default()
        };

        let result = run_server(config).await;

        assert!(matches!(result, Err(ServerError::Root { .. })));
    }

    #[tokio::test]
    async fn test_run_server_fails_on_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            root: dir.path().to_path_buf(),
            port: 0,
            ..ServerConfig::default()
        };

        let result = run_server(config).await;

        assert!(matches!(result, Err(ServerError::Templates(_))));
    }
}
