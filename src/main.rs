use clap::Parser;
use miette::Result;
use pesa::interfaces::cli::{Cli, run};
use pesa::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli).await
}
