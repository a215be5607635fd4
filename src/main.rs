// file: src/main.rs
// version: 1.0.0
// guid: b0d2f4a6-8c31-4e5d-97a9-c1e3f5a7b928

//! Ubuntu ISO Builder - Main entry point

use clap::Parser;
use tokio::signal;
use tracing::warn;
use ubuntu_iso_builder::{
    cli::{
        args::{Cli, Commands},
        commands::*,
    },
    logging::logger,
    Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.verbose, cli.quiet)?;

    let command_future = async {
        match cli.command {
            Commands::BuildIso {
                install,
                source_iso,
                output,
                work_dir,
            } => build_iso_command(install.into(), &source_iso, &output, work_dir).await,
            Commands::GenerateConfig { install, output } => {
                generate_config_command(install.into(), output).await
            }
            Commands::CheckPrereqs => check_prerequisites_command().await,
        }
    };

    tokio::select! {
        result = command_future => result,
        _ = signal::ctrl_c() => {
            warn!("Interrupted, partial build artifacts left in the working directory");
            std::process::exit(130);
        }
    }
}
