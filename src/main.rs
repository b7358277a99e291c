//! TLS-terminating HTTP reverse proxy
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──TLS──▶ net::tls ──▶ http::server ──▶ routing ──▶ http::client ──▶ Backend
//!                                      │                            │
//!                                      ▼                            ▼
//!                               security::cors            resilience::timeouts
//!                               security::headers
//!
//!     Cross-cutting: config, observability (logs + metrics), lifecycle (signals + drain)
//! ```
//!
//! # Startup Order
//! config → logging → metrics → route table → bind → serve

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::net::TcpListener;

use route_proxy::config::load_config_with_bind;
use route_proxy::lifecycle::{signals, Shutdown};
use route_proxy::observability::{logging, metrics};
use route_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "route-proxy")]
#[command(about = "TLS-terminating reverse proxy with prefix routing and CORS", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "proxy.toml")]
    config: PathBuf,

    /// Override listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config_with_bind(&args.config, args.bind.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {}: {e}", args.config.display());
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);

    if args.check {
        println!(
            "{}: ok ({} routes)",
            args.config.display(),
            config.routes.len()
        );
        return ExitCode::SUCCESS;
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Proxy exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: route_proxy::ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        routes = config.routes.len(),
        "route-proxy starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
