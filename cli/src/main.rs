#![allow(clippy::exit)]

mod cli;
mod commands;
mod output;
mod timing;

use anyhow::Result;
use clap::Parser as _;
use palabra_business::TransferState;

use crate::cli::{Cli, Commands};
use crate::commands::{generate_completions, run_upload};
use crate::output::Output;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    timing::init_tracing(cli.verbose, cli.timing);

    match cli.command {
        Commands::Upload(args) => {
            let out = Output::new();
            let state = match run_upload(&args, &out).await {
                Ok(state) => state,
                Err(e) => {
                    out.error(format!("{e:#}"));
                    std::process::exit(1);
                }
            };
            if matches!(state, TransferState::Failed(_)) {
                std::process::exit(1);
            }
        }
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}
