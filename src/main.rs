//! Request filter proxy.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout ─▶ request filter ─┬─▶ upstream
//!                                                                      │
//!     ◀── 403 / 400 ◀──────────────────────────────────────────────────┘
//! ```
//!
//! Forbidden header, query and body values are configured in a TOML file; see
//! `request-filter.example.toml`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use request_filter::config::{load_config, watcher::ConfigWatcher, ConfigError};
use request_filter::lifecycle::{shutdown_on_signal, Shutdown};
use request_filter::observability::{init_logging, metrics};
use request_filter::{HttpServer, RequestFilter};

#[derive(Parser)]
#[command(name = "request-filter")]
#[command(about = "Reject requests carrying forbidden header, query or body values", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "request-filter.toml")]
    config: PathBuf,

    /// Validate the configuration, print the compiled rules and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    if cli.check {
        let filter = RequestFilter::from_config(&config.filter).map_err(ConfigError::Validation)?;
        println!("{}: configuration OK", cli.config.display());
        println!("{}", filter);
        return Ok(());
    }

    init_logging(&config.observability)?;

    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        header_rules = config.filter.headers.len(),
        query_rules = config.filter.query.len(),
        body_rules = config.filter.body.json.len(),
        "Configuration loaded"
    );
    if !config.filter.body.regex.is_empty() {
        tracing::warn!("filter.body.regex is reserved and not evaluated");
    }

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    // Keep the watcher alive for the lifetime of the server
    let (_watcher, config_updates) = if config.reload.enabled {
        let (watcher, updates) = ConfigWatcher::new(
            &cli.config,
            Duration::from_secs(config.reload.poll_interval_secs),
        );
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown));

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
