//! EOS History API - Main entry point

use std::process;
use std::sync::Arc;
use tracing::{error, info};

use eos_history_api::{
    api::ApiServer,
    cache::CountCache,
    cli,
    config::Config,
    service::HistoryService,
    store::{MemoryStore, Store},
};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = cli::parse_args();

    // Initialize logging
    init_logging(&args);

    // Load configuration (use defaults unless config file is provided)
    let mut config = if let Some(config_path) = &args.config_path {
        Config::load(config_path).unwrap_or_else(|_| Config::default())
    } else {
        Config::default()
    };

    // Apply CLI overrides
    config.apply_cli_overrides(&args);

    info!("Starting EOS history API v{}", env!("CARGO_PKG_VERSION"));

    // Build the document store, optionally pre-loaded from a snapshot
    let memory_store = MemoryStore::new();
    if let Some(snapshot) = &config.store.snapshot_path {
        info!("Loading history snapshot from {:?}", snapshot);
        if let Err(e) = memory_store.load_snapshot(snapshot) {
            error!("Failed to load snapshot: {}", e);
            process::exit(1);
        }
    }
    let store: Arc<dyn Store> = Arc::new(memory_store);

    // Wire the query service with its count cache
    let cache = CountCache::new(config.cache.bounded_capacity(), config.cache.time_to_live());
    let service = Arc::new(HistoryService::new(store, cache));

    // Start API server
    let server = ApiServer::new(service, config.server.bind_address.clone(), config.server.port);
    info!(
        "Starting API server on {}:{}",
        config.server.bind_address, config.server.port
    );
    if let Err(e) = server.start().await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}

fn init_logging(args: &cli::Args) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}
