//! Vaultvol CLI: fetch vault volumes concurrently and print a report.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use vaultvol::engine::arg_parser::Cli;
use vaultvol::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
