//! Sluicer CLI: watch a directory and route files by extension; use --once
//! to drain and exit.

use anyhow::Result;
use clap::Parser;
use sluicer::engine::arg_parser::Cli;
use sluicer::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
