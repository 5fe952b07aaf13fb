//! `hotpage serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use hotpage_config::{CliSettings, Config};
use hotpage_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover hotpage.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template root directory (overrides config).
    #[arg(short, long, env = "HOTPAGE_ROOT")]
    root: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (reload and request logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable live reload (default: enabled).
    #[arg(long)]
    live_reload: Option<bool>,

    /// Disable live reload.
    #[arg(long, conflicts_with = "live_reload")]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let live_reload_enabled = self.resolve_live_reload_enabled();
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            root: self.root,
            live_reload_enabled,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(path = ?config.config_path, "Configuration loaded");

        output.print(Tone::Highlight, &format!(
            "Serving on http://{}:{}",
            config.server.host, config.server.port
        ));
        output.print(Tone::Plain, &format!(
            "Template root: {}",
            config.templates_resolved.root.display()
        ));
        output.print(Tone::Plain, &format!("Index template: {}", config.templates_resolved.index));

        if config.live_reload.enabled {
            output.print(Tone::Plain, &format!(
                "Live reload: enabled (ws://{}:{}{})",
                config.server.host, config.server.port, config.live_reload.endpoint
            ));
        } else {
            output.print(Tone::Warning, "Live reload: disabled");
        }

        run_server(server_config_from_config(&config)).await?;

        Ok(())
    }

    /// Resolve `live_reload_enabled` from --live-reload/--no-live-reload flags.
    fn resolve_live_reload_enabled(&self) -> Option<bool> {
        self.no_live_reload.then_some(false).or(self.live_reload)
    }
}
