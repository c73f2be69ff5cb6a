//! HashKV - A Small In-Memory Key-Value Store
//!
//! This is the main entry point for the HashKV server.
//! It parses configuration, sets up logging, binds the listener and runs
//! the accept loop until the listener fails or Ctrl+C is received.

use clap::Parser;
use hashkv::connection::ConnectionStats;
use hashkv::storage::Store;
use hashkv::{serve_with_stats, Config};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Set up logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(version = hashkv::VERSION, "Starting HashKV");

    // Create the store (shared across all connections)
    let store = Arc::new(Store::new());
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Main accept loop, raced against Ctrl+C
    tokio::select! {
        result = serve_with_stats(listener, Arc::clone(&store), Arc::clone(&stats)) => {
            if let Err(e) = result {
                error!(error = %e, "Accept loop terminated");
                return Err(e.into());
            }
        }
        result = signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received, stopping server...");
        }
    }

    let store_stats = store.stats();
    info!(
        keys = store_stats.keys,
        get_ops = store_stats.get_ops,
        set_ops = store_stats.set_ops,
        del_ops = store_stats.del_ops,
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}
