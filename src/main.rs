//! Verification Service
//!
//! An HTTP API that records and looks up verified values.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout / body limit
//!                                                  │
//!                                                  ▼
//!                                     ┌────────────────────────┐
//!                                     │ per-IP rate limiter    │──▶ 429 / 500
//!                                     └───────────┬────────────┘
//!                                                 ▼
//!                                     ┌────────────────────────┐
//!                                     │ GET/POST /verify       │
//!                                     └───────────┬────────────┘
//!                                                 ▼
//!                                     ┌────────────────────────┐
//!                                     │ verification store     │
//!                                     │ (canonical key → rec)  │
//!                                     └────────────────────────┘
//!
//!     Background: rate limiter sweep evicts idle client buckets
//! ```

use std::path::PathBuf;

use clap::Parser;

use verification_service::config::{load_config, validate_config, ConfigError, ServiceConfig};
use verification_service::lifecycle::startup;
use verification_service::observability::logging;

#[derive(Parser)]
#[command(name = "verification-service")]
#[command(about = "HTTP API for recording and looking up verified values", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability);

    tracing::info!("verification-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        requests_per_second = config.rate_limit.requests_per_second,
        burst_size = config.rate_limit.burst_size,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
