// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! List command implementation.

use std::io::Write;

use serde::Serialize;
use termcolor::{StandardStream, WriteColor};

use fleetreport::cli::{Cli, ListArgs};
use fleetreport::color::{resolve_color, scheme};
use fleetreport::error::ExitCode;
use fleetreport::factory::ReportFactory;
use fleetreport::session::Session;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportSummary<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    report_type: &'a str,
    class_name: &'a str,
    layout: &'a str,
    title: &'a str,
    menu_description: &'a str,
    columns: Vec<String>,
}

impl<'a> From<&'a ReportFactory> for ReportSummary<'a> {
    fn from(factory: &'a ReportFactory) -> Self {
        Self {
            name: factory.name(),
            report_type: factory.report_type(),
            class_name: factory.class_name(),
            layout: factory.layout().class_name(),
            title: factory.title(),
            menu_description: factory.menu_description(),
            columns: factory.columns().iter().map(|c| c.key_name()).collect(),
        }
    }
}

/// Print the reports in the definition.
pub fn run(cli: &Cli, args: &ListArgs) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let session = Session::load(cli.config.as_deref(), &cwd)?;
    let reports = session.registry().reports();

    if args.json {
        let summaries: Vec<ReportSummary<'_>> =
            reports.iter().map(|f| ReportSummary::from(f.as_ref())).collect();
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &summaries)?;
        writeln!(handle)?;
        return Ok(ExitCode::Success);
    }

    let mut stdout = StandardStream::stdout(resolve_color());
    for factory in reports {
        stdout.set_color(&scheme::name())?;
        write!(stdout, "{}", factory.name())?;
        stdout.reset()?;
        writeln!(stdout, " [{}]  {}", factory.report_type(), factory.menu_description())?;
    }
    Ok(ExitCode::Success)
}
