#![warn(clippy::all, clippy::pedantic)]

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use actix_web::{App, HttpServer, web::Data};
use clap::Parser;
use dotenvy::dotenv;
use observer::{Observer, ObserverConfig, ProbeRegistry};
use prometheus::Registry;
use tokio::sync::watch;
use tracing::{debug, info};

mod error;
mod routes;

use error::AppError;
use logger::init_tracing;

/// Runs the configured monitors and exposes their outcomes as metrics
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the observer configuration file (yaml, toml or json)
    #[arg(short, long, env = "OBSERVER_CONFIG", default_value = "config.yml")]
    config: PathBuf,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ObserverConfig::from_path(&cli.config)?;
    let port = config.debug_port()?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting observer");
    debug!(?config, "using config");

    let metrics = Registry::new();
    let probes = ProbeRegistry::builtin()?;
    let observer = Observer::new(config, &probes, &metrics)?;

    info!(config = %cli.config.display(), "initializing observer daemon");
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitors = tokio::spawn(observer.run(shutdown_rx));

    // Returns once the server has been stopped by a signal.
    let served = run_debug_server(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)), metrics).await;

    info!("shutting down monitors");
    let _ = shutdown_tx.send(true);
    monitors.await?;

    served
}

async fn run_debug_server(addr: SocketAddr, metrics: Registry) -> Result<(), AppError> {
    info!(%addr, "debug server listening");

    HttpServer::new(move || {
        App::new().app_data(Data::new(metrics.clone())).configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
