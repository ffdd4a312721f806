mod cli;
mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use cli::{Cli, Command};
use config::Workspace;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let workspace = Workspace::resolve(cli.workspace.clone());
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level, &workspace.log_path());

    match cli.command {
        Command::Run => {
            let report = commands::run_pipeline(&workspace)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Publish { file } => {
            let receipt = commands::publish_file(&file)?;
            println!("{}", serde_json::to_string(&receipt.raw)?);
        }
    }
    Ok(())
}
