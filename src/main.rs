// Karen control-plane core — entry point.

use anyhow::Result;
use clap::Parser;

use karen_core::cli::Cli;
use karen_core::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let cli = Cli::parse();
    cli.run().await
}
