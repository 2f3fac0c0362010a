//! Callback correlation gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!   Caller                    GATEWAY                          Downstream
//!     │  POST /messages   ┌──────────────┐   POST /messages/      │
//!     ├──────────────────▶│ coordinator  │───────────────────────▶│
//!     │   (held open)     │   register   │                        │
//!     │                   │   wait ◀─┐   │                        │
//!     │                   └──────────┼───┘                        │
//!     │                        ┌─────┴─────┐   POST /webhook      │
//!     │                        │ registry  │◀─────────────────────┤
//!     │   200 + payload        └───────────┘   (conversation_id)  │
//!     ◀─────────────────  or 504 on timeout, 409 on duplicate, 502 on forward failure
//! ```

use clap::Parser;
use std::path::PathBuf;

use callback_gateway::config::loader::{finalize, load_config};
use callback_gateway::config::GatewayConfig;
use callback_gateway::lifecycle::startup;
use callback_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "callback-gateway", version, about = "Holds requests open until their webhook callback arrives")]
struct Cli {
    /// TOML configuration file. Watched for changes to the callback timeout.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => finalize(GatewayConfig::default())?,
    };

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "callback-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        timeout_secs = config.correlation.timeout_secs,
        downstream = %config.downstream.base_url,
        "Configuration loaded"
    );

    startup::run(config, cli.config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
