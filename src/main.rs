use anyhow::{Context, Result};
use clap::Parser;
use grid_dispatch::config::AppConfig;
use grid_dispatch::dispatch::DispatchCoordinator;
use grid_dispatch::driver;
use grid_dispatch::store::InMemoryGridStore;
use grid_dispatch::transport::UdpSender;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Reads grid clicks from stdin and dispatches their commands over UDP
#[derive(Debug, Parser)]
#[command(name = "grid-dispatch", version)]
struct Cli {
    /// TOML config file with `[dispatch]` and `[[grid_items]]`
    #[arg(long, env = "GRID_DISPATCH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries one JSON result per request
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let store = Arc::new(InMemoryGridStore::new());
    for item in &config.grid_items {
        store
            .create(item.clone())
            .await
            .with_context(|| format!("seeding grid item {:?}", item.title))?;
    }

    let sender = Arc::new(UdpSender::from_config(&config.dispatch));
    let coordinator = Arc::new(DispatchCoordinator::new(
        store.clone(),
        sender,
        config.dispatch.clone(),
    ));

    info!("Grid dispatch starting");
    info!("  Target: {}", coordinator.target());
    info!("  Grid items: {}", store.count().await);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight dispatches");
            ctrl_c.cancel();
        }
    });

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(line) = out_rx.recv().await {
            println!("{}", line);
        }
    });

    let input = BufReader::new(tokio::io::stdin());
    let served = driver::run(input, coordinator, store, cancel, out_tx).await;

    // Every sender is gone once the driver returns, so the printer drains and exits
    printer.await.context("stdout printer task")?;

    info!("Grid dispatch stopped");
    served
}
