//! Single-proposer rollup node.
//!
//! This binary orchestrates:
//! - block production from the local mempool
//! - DA submission of produced blocks
//! - state persistence and bootstrap

#![warn(missing_docs)]

mod cli;
mod config;
mod node;

use clap::Parser;
use eyre::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    cli.run().await
}
