//! ttlkv Server Binary
//!
//! Opens the store and starts the TCP server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};
use ttlkv::network::Server;
use ttlkv::{BackendConfig, Config, Store};

/// Snapshot backend selection
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    None,
    Json,
    Snapshot,
    Sqlite,
}

/// ttlkv Server
#[derive(Parser, Debug)]
#[command(name = "ttlkv-server")]
#[command(about = "In-memory key-value store with TTL and periodic snapshots")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Seconds between snapshots (0 disables backup)
    #[arg(short, long, default_value = "0")]
    backup_interval_secs: u64,

    /// Where snapshots are kept
    #[arg(long, value_enum, default_value = "none")]
    backend: Backend,

    /// File used by the json, snapshot and sqlite backends
    #[arg(long, default_value = "./ttlkv_snapshot")]
    backend_path: PathBuf,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ttlkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let backend = match args.backend {
        Backend::None => BackendConfig::None,
        Backend::Json => BackendConfig::JsonFile {
            path: args.backend_path.clone(),
        },
        Backend::Snapshot => BackendConfig::SnapshotFile {
            path: args.backend_path.clone(),
        },
        Backend::Sqlite => BackendConfig::Sqlite {
            path: args.backend_path.clone(),
        },
    };

    tracing::info!("ttlkv Server v{}", ttlkv::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Backend: {:?}", backend);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .backup_interval(Duration::from_secs(args.backup_interval_secs))
        .backend(backend)
        .build();

    // Open store
    let store = match Store::open(config.clone()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        backend = store.backend_name(),
        entries = store.len(),
        "Store initialized"
    );

    // Start server
    let server = match Server::bind(config, Arc::clone(&store)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl-C stops the accept loop; the final snapshot is taken below
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received shutdown signal");
        shutdown.shutdown();
    }) {
        tracing::warn!("Failed to install Ctrl-C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = finish(store) {
        tracing::error!("Final snapshot failed: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Stop the store and take the final snapshot
///
/// Connection threads may still hold the store; in that case the snapshot
/// is taken directly and the loops stop when the last handle drops.
fn finish(store: Arc<Store>) -> ttlkv::Result<()> {
    match Arc::try_unwrap(store) {
        Ok(store) => store.close(),
        Err(shared) => {
            if shared.config().backup_enabled() {
                let count = shared.backup_now()?;
                tracing::info!(entries = count, "final snapshot saved");
            }
            Ok(())
        }
    }
}
