//! Packguard CLI: the `packguard` command.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            root,
            data_dir,
            schema_dir,
            manifest,
            report,
            fix,
            fail_on_warning,
            jobs,
            timestamp,
            json,
        } => commands::check::run(commands::check::Args {
            root,
            data_dir,
            schema_dir,
            manifest,
            report,
            fix,
            fail_on_warning,
            jobs,
            timestamp,
            json,
        }),
    }
}
