// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fleetreport CLI entry point.

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt};

use fleetreport::cli::{Cli, Command};
use fleetreport::error::ExitCode;

mod cmd_check;
mod cmd_columns;
mod cmd_list;
mod cmd_render;

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("FLEETREPORT_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fleetreport: {}", e);
            match e.downcast_ref::<fleetreport::Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::InternalError,
            }
        }
    };

    std::process::exit(exit_code as i32);
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match &cli.command {
        None => {
            // Show help for bare invocation
            Cli::command().print_help()?;
            println!();
            Ok(ExitCode::Success)
        }
        Some(Command::Render(args)) => cmd_render::run(&cli, args),
        Some(Command::List(args)) => cmd_list::run(&cli, args),
        Some(Command::Columns(args)) => cmd_columns::run(&cli, args),
        Some(Command::Check) => cmd_check::run(&cli),
    }
}
