//! Sizeswap CLI - Operator tools for the webhook service.
//!
//! # Usage
//!
//! ```bash
//! # Show how each line item of a saved payload resolves
//! sizeswap resolve payload.json
//!
//! # Same, with the suffix-only marker rule
//! sizeswap resolve payload.json --pattern suffix
//!
//! # Run the replacement for real against the configured store
//! sizeswap replay payload.json
//! ```
//!
//! # Commands
//!
//! - `resolve` - Offline placeholder resolution
//! - `replay` - Full order edit for a saved payload

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sizeswap_core::MarkerPattern;
use sizeswap_webhooks::config::ReconcileConfig;

mod commands;

#[derive(Parser)]
#[command(name = "sizeswap")]
#[command(author, version, about = "Sizeswap operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve placeholder line items without contacting Shopify
    Resolve {
        /// Webhook payload (JSON)
        file: PathBuf,

        /// Marker rule (`substring` or `suffix`); defaults to `SIZE_MARKER_PATTERN`
        #[arg(short, long)]
        pattern: Option<MarkerPattern>,
    },
    /// Replace placeholder line items on the live order
    Replay {
        /// Webhook payload (JSON)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Resolve { file, pattern } => {
            let pattern = match pattern {
                Some(pattern) => pattern,
                None => {
                    dotenvy::dotenv().ok();
                    ReconcileConfig::from_env()?.pattern
                }
            };
            commands::resolve::run(&file, pattern)?;
        }
        Commands::Replay { file } => commands::replay::run(&file).await?,
    }
    Ok(())
}
