//! OpenMarket CLI and Server Binary
//!
//! Entry point for the marketplace backend. Provides commands for
//! initializing, validating, and serving.

use anyhow::{Context, Result};
use chain::{FeeOracle, MockFeeOracle, RpcEndpoint, RpcFeeOracle};
use cli::{Cli, Commands};
use common::ChainId;
use config::{generate_default_config, load_config, save_config, validate_config, MarketConfig};
use docstore::MemoryStore;
use metadata::{MetadataResolver, NoopIndexer};
use observability::{init_logging, LogFormat};
use orders::api::{create_router, OrdersApiState};
use orders::{MatchQueryService, OrderLedger};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start { config, http } => start_server(config, http).await,
        Commands::Validate { config } => validate_command(config),
        Commands::Init { output } => init_command(output),
    }
}

async fn start_server<P: AsRef<Path>>(config_path: P, http_override: Option<u16>) -> Result<()> {
    let config = load_config(&config_path)?;

    let format = LogFormat::parse(&config.logging.format).unwrap_or_default();
    init_logging("openmarket", format)?;

    let report = validate_config(&config);
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message);
    }
    if !report.is_valid() {
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start server due to configuration errors");
    }

    let port = http_override.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);

    let store = Arc::new(MemoryStore::new());
    let oracle = build_oracle(&config);
    let resolver = Arc::new(MetadataResolver::new(store.clone(), Arc::new(NoopIndexer)));
    let ledger = Arc::new(OrderLedger::new(store.clone(), resolver, oracle));
    let matches = Arc::new(MatchQueryService::new(store));

    let router = create_router(OrdersApiState { ledger, matches })
        .layer(tower_http::trace::TraceLayer::new_for_http());

    info!(
        marketplace = %config.marketplace.name,
        %addr,
        "Starting OpenMarket server"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// JSON-RPC oracle over the enabled chains, or the mock oracle when no
/// chain is configured
fn build_oracle(config: &MarketConfig) -> Arc<dyn FeeOracle> {
    let endpoints: HashMap<ChainId, RpcEndpoint> = config
        .chains
        .iter()
        .filter(|c| c.enabled)
        .filter_map(|c| {
            let chain_id = ChainId::parse(&c.chain_id)?;
            Some((
                chain_id,
                RpcEndpoint {
                    url: c.rpc_url.clone(),
                    fee_treasury: c.fee_treasury.clone(),
                    creators_fee_manager: c.creators_fee_manager.clone(),
                },
            ))
        })
        .collect();

    if endpoints.is_empty() {
        warn!("no enabled chains configured; using the mock fee oracle");
        Arc::new(MockFeeOracle::new())
    } else {
        info!(chains = endpoints.len(), "using JSON-RPC fee oracle");
        Arc::new(RpcFeeOracle::new(endpoints))
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = load_config(&config_path)?;
    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Marketplace: {}", config.marketplace.name);
    println!("Version: {}", config.marketplace.version);
    println!(
        "Chains: {} ({} enabled)",
        config.chains.len(),
        config.chains.iter().filter(|c| c.enabled).count()
    );

    Ok(())
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration: add your chains' RPC endpoints");
    println!("     and fee contract addresses, and set them enabled");
    println!(
        "  2. Run 'openmarket validate --config {:?}' to check it",
        output_path
    );
    println!(
        "  3. Run 'openmarket start --config {:?}' to serve",
        output_path
    );

    Ok(())
}
