//! Reverse Hash Service node server.
//!
//! Usage: `rhs-server [config.toml]`. Only the `[server]` section is read;
//! without a config file the server listens on 127.0.0.1:3001. Nodes are
//! kept in memory and lost on restart.

use std::{
    path::PathBuf,
    sync::Arc,
};

use iden3_proofs::{
    adapters::memory_rhs::InMemoryNodeStore,
    config::Config,
    server,
};
use tracing::{
    error,
    info,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Config::load(&path).unwrap_or_else(|e| {
            error!("cannot load config {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => Config::default(),
    };

    let store = Arc::new(InMemoryNodeStore::new());
    let (handle, bound_addr) = server::start_server(store, config.server.listen_addr)
        .await
        .unwrap_or_else(|e| {
            error!("cannot start server: {e}");
            std::process::exit(1);
        });
    info!(%bound_addr, "RHS server listening");

    tokio::signal::ctrl_c().await.ok();
    info!("shutting down");
    handle.abort();
}
