//! Command dispatch for onto-rollup

pub mod rollup;
pub mod summary;

use std::time::Instant;

use onto_rollup_core::error::Result;
use tracing::debug;

use crate::cli::Cli;

/// Message printed when no configuration path is given
pub const MISSING_CONFIG_MESSAGE: &str = "Configuration file path must be provided.";

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    match &cli.config {
        None => {
            debug!("no configuration path given");
            println!("{}", MISSING_CONFIG_MESSAGE);
            Ok(())
        }
        Some(path) => rollup::execute(cli, path, start),
    }
}
