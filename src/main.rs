//! dgml - build DGML graph documents from component descriptions

mod build_cli;
mod config;
mod input;

use clap::Parser;
use config::CliConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dgml")]
#[command(about = "Rule-driven DGML graph builder", version)]
struct Cli {
    #[command(subcommand)]
    command: build_cli::Commands,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    build_cli::run(cli.command, CliConfig::from_env())
}
