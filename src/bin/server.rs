//! MmapKV Server Binary
//!
//! Opens the store and serves it over TCP.

use std::sync::Arc;

use clap::Parser;
use mmapkv::network::Server;
use mmapkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// MmapKV Server
#[derive(Parser, Debug)]
#[command(name = "mmapkv-server")]
#[command(about = "Log-structured key-value store on a memory-mapped file")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./mmapkv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8090")]
    listen: String,

    /// Arena capacity in MB (fixed until restart)
    #[arg(short, long, default_value = "8")]
    capacity_mb: usize,

    /// Maximum queued connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Connection worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Only drop deleted keys from the in-memory index (they return after restart)
    #[arg(long)]
    volatile_deletes: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mmapkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("MmapKV Server v{}", mmapkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .capacity(args.capacity_mb * 1024 * 1024)
        .durable_deletes(!args.volatile_deletes)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .build();

    // The store must not serve requests if it cannot be mapped or recovered
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Engine initialized: {} keys, {} of {} bytes used",
        engine.key_count(),
        engine.cursor(),
        engine.capacity()
    );

    let server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
