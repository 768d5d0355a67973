//! Command-line entry point for the lifelink blood bank manager.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
