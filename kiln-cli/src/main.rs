//! Kiln CLI
//!
//! Command-line interface for submitting and following jobs on a recipe
//! machine.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Recipe machine job CLI", long_about = None)]
struct Cli {
    /// Machine URL
    #[arg(long, env = "KILN_MACHINE_URL", default_value = "http://localhost:8000")]
    machine_url: String,

    /// Identity under which jobs are submitted and looked up
    #[arg(long, env = "KILN_CLIENT_ID")]
    client_id: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiln_cli=info,kiln_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.machine_url, cli.client_id)?;

    handle_command(cli.command, &config).await
}
