// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Columns command implementation.

use std::io::Write;

use termcolor::{StandardStream, WriteColor};

use fleetreport::cli::{Cli, ColumnsArgs};
use fleetreport::color::{resolve_color, scheme};
use fleetreport::error::ExitCode;
use fleetreport::session::Session;
use fleetreport::template::normalize_key;

/// Print the columns the report's layout offers; `*` marks the ones it shows.
pub fn run(cli: &Cli, args: &ColumnsArgs) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let session = Session::load(cli.config.as_deref(), &cwd)?;
    let factory = session.report_factory(&args.report)?;
    let layout = factory.layout();

    let mut stdout = StandardStream::stdout(resolve_color());
    writeln!(stdout, "Layout: {}", layout.class_name())?;
    for (name, title) in layout.catalog().column_titles() {
        let used = factory
            .columns()
            .iter()
            .any(|c| normalize_key(c.name()) == name);
        write!(stdout, "{} ", if used { '*' } else { ' ' })?;
        stdout.set_color(&scheme::name())?;
        write!(stdout, "{:<12}", name)?;
        stdout.reset()?;
        writeln!(stdout, " {}", title.replace("\\n", " "))?;
    }
    Ok(ExitCode::Success)
}
