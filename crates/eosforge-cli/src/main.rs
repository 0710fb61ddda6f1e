//! `eosforge` command-line entry point.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use eosforge_core::{
    ConfigError, model::FileStateError, workflow::template::TemplateError,
};
use thiserror::Error as ThisError;

///
/// CliError
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    FileState(#[from] FileStateError),

    #[error("cannot render output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = commands::load_config(&cli.config)?;

    let out = commands::execute(&config, cli.command)?;
    if !out.is_empty() {
        println!("{out}");
    }

    Ok(())
}
