// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Check command implementation.

use std::io::Write;

use termcolor::{StandardStream, WriteColor};

use fleetreport::cli::Cli;
use fleetreport::color::{resolve_color, scheme};
use fleetreport::error::ExitCode;
use fleetreport::session::Session;

/// Parse the definition and print its warnings and errors.
pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let session = Session::load(cli.config.as_deref(), &cwd)?;
    let registry = session.registry();
    let log = registry.log();

    let mut stdout = StandardStream::stdout(resolve_color());
    stdout.set_color(&scheme::path())?;
    write!(stdout, "{}", session.definition().display())?;
    stdout.reset()?;
    writeln!(stdout)?;

    for warning in log.warnings() {
        stdout.set_color(&scheme::warning())?;
        write!(stdout, "warning")?;
        stdout.reset()?;
        writeln!(stdout, ": {}", warning)?;
    }
    for error in log.errors() {
        stdout.set_color(&scheme::error())?;
        write!(stdout, "error")?;
        stdout.reset()?;
        writeln!(stdout, ": {}", error)?;
    }

    if registry.has_parsing_errors() {
        writeln!(
            stdout,
            "{} error(s), {} warning(s)",
            log.errors().len(),
            log.warnings().len()
        )?;
        return Ok(ExitCode::ConfigError);
    }

    stdout.set_color(&scheme::ok())?;
    write!(stdout, "ok")?;
    stdout.reset()?;
    writeln!(
        stdout,
        ": {} report(s), {} warning(s)",
        registry.len(),
        log.warnings().len()
    )?;
    Ok(ExitCode::Success)
}
