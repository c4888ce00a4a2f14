//! TMDB forwarding gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  GATEWAY                     │
//!   GET /tmdb/movie/550  │  ┌────────┐   ┌──────────┐   ┌───────────┐   │
//!   ─────────────────────┼─▶│  http  │──▶│ routing  │──▶│ upstream  │───┼──▶ api.themoviedb.org/3
//!                        │  │ server │   │ (prefix) │   │  client   │   │     /movie/550
//!   ◀────────────────────┼──│        │◀──────────────────│           │◀──┼───
//!   raw body / envelope  │  └────────┘                   └───────────┘   │
//!                        │                                               │
//!                        │  config · observability · security · lifecycle│
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use tmdb_gateway::config::validation::validate_config;
use tmdb_gateway::config::{resolve_config, ConfigError, GatewayConfig};
use tmdb_gateway::lifecycle::signals::wait_for_termination;
use tmdb_gateway::observability::{logging, metrics};
use tmdb_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "tmdb-gateway", version)]
#[command(about = "Forwards /tmdb/* requests to the TMDB API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the file and PORT.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration, print it and exit.
    #[arg(long)]
    check: bool,
}

fn load(cli: &Cli) -> Result<GatewayConfig, ConfigError> {
    let mut config = resolve_config(cli.config.as_deref(), |key| std::env::var(key).ok())?;
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    if cli.check {
        let mut shown = config.clone();
        if shown.upstream.token().is_some() {
            shown.upstream.bearer_token = Some("<redacted>".to_string());
        }
        println!("{}", toml::to_string_pretty(&shown)?);
        return Ok(());
    }

    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tmdb-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        route_prefix = %config.upstream.route_prefix,
        token_configured = config.upstream.token().is_some(),
        environment = ?config.observability.environment,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    let mut serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut serving => {
            result??;
            return Ok(());
        }
        _ = wait_for_termination() => {}
    }

    shutdown.trigger();
    match tokio::time::timeout(grace, serving).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!(
            grace_secs = grace.as_secs(),
            "In-flight requests did not drain in time, exiting"
        ),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
