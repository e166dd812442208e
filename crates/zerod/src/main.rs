//! Zero Daemon - offline caching HTTP proxy

mod config;
mod fetcher;
mod handler;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};
use zerostore::MemoryCacheStore;
use zeroworker::ServiceWorker;

use crate::config::load_worker_config;
use crate::fetcher::ReqwestFetcher;
use crate::handler::{AppState, STATS_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Upstream origin the worker is scoped to
    #[arg(short, long, default_value = "http://127.0.0.1:3000/")]
    origin: String,

    /// Worker config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream request timeout in seconds
    #[arg(short, long, default_value_t = 10)]
    timeout_secs: u64,

    /// Health check mode (for Docker)
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.health {
        match TcpStream::connect(&args.bind).await {
            Ok(_) => {
                println!("OK");
                std::process::exit(0);
            }
            Err(_) => {
                eprintln!("FAILED");
                std::process::exit(1);
            }
        }
    }

    info!("Starting Zero Daemon v{}", env!("CARGO_PKG_VERSION"));
    info!("Binding to {}", args.bind);

    let config = load_worker_config(args.config.as_deref(), &args.origin)?;
    let origin = config.scope.clone();
    let namespace = config.namespace();
    info!("Origin: {}", origin);
    info!("Cache namespace: {}", namespace);

    let store = Arc::new(MemoryCacheStore::new());
    let fetcher = Arc::new(ReqwestFetcher::new(Duration::from_secs(args.timeout_secs))?);
    let worker = ServiceWorker::new(config, store.clone(), fetcher);

    // Without a populated cache the worker never activates and every
    // request goes straight upstream.
    match worker.install().await {
        Ok(()) => match worker.activate().await {
            Ok(report) => info!(
                "Worker active, {} stale namespaces deleted",
                report.deleted.len()
            ),
            Err(e) => warn!("Worker active, stale namespaces kept: {}", e),
        },
        Err(e) => error!("Worker registration failed, passing requests through: {}", e),
    }

    let state = Arc::new(AppState {
        worker,
        store,
        origin: origin.clone(),
    });
    let app = handler::app(state);

    let listener = TcpListener::bind(&args.bind).await?;
    info!("Server listening on {}", args.bind);

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║          Zero Proxy Ready!                                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("\n📡 PROXY:");
    println!("   Listening:  http://{}", args.bind);
    println!("   Origin:     {}", origin);
    println!("   Namespace:  {}", namespace);
    println!("   Stats:      http://{}{}", args.bind, STATS_PATH);
    println!("\n🛑 Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
