//! StrataKV Server Binary
//!
//! Opens the engine and serves it over TCP.

use std::sync::Arc;

use clap::Parser;
use stratakv::network::Server;
use stratakv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// StrataKV Server
#[derive(Parser, Debug)]
#[command(name = "stratakv-server")]
#[command(about = "Embedded LSM key-value store served over TCP")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    listen: String,

    /// Connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// MemTable size limit in KiB before flush
    #[arg(short = 'm', long, default_value = "1024")]
    memtable_kb: u64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stratakv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("StrataKV Server v{}", stratakv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let memtable_size_limit = match kib_to_bytes(args.memtable_kb) {
        Some(bytes) => bytes,
        None => {
            tracing::error!("--memtable-kb {} is too large", args.memtable_kb);
            std::process::exit(1);
        }
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .memtable_size_limit(memtable_size_limit)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Convert a KiB count to bytes; `None` if it doesn't fit in a u64
fn kib_to_bytes(kib: u64) -> Option<u64> {
    kib.checked_mul(1024)
}
