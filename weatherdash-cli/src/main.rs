//! Binary crate for the `weatherdash` tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Serving the browser dashboard
//! - Human-friendly terminal output

use clap::Parser;

mod cli;
mod logging;
mod render;
mod terminal;
mod web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cmd = cli::Cli::parse();
    cmd.run().await
}
