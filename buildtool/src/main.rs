use std::process::ExitCode;

use buildcommon::prelude::*;
use clap::Parser;

mod cli;
mod cmd_checkenv;
mod cmd_clean;
mod cmd_configure;
mod cmd_show;
mod error;

use cli::{Cli, Command};
use error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.apply_print_options();

    if let Err(e) = main_internal(&cli) {
        if cli.is_trace_on() {
            eprintln!("error: {:?}", e);
        } else {
            errorln!("Error", "{}", e);
            hintln!("Consider", "Run with --trace to see the full error");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main_internal(cli: &Cli) -> Result<(), Error> {
    match &cli.command {
        Command::Configure(_) => cmd_configure::run(&cli.top).into_report(),
        Command::Checkenv(options) => cmd_checkenv::run(&cli.top, options),
        Command::Show(options) => cmd_show::run(&cli.top, options),
        Command::Clean(_) => cmd_clean::run(&cli.top),
    }
}
