// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Render command implementation.

use std::io::Write;

use fleetreport::cli::{Cli, RenderArgs};
use fleetreport::error::{Error, ExitCode};
use fleetreport::presentation::{self, ReportFormat};
use fleetreport::session::{DeviceSelection, RenderRequest, Session};

fn render_request(args: &RenderArgs) -> RenderRequest {
    let devices = match &args.group {
        Some(group) => DeviceSelection::Group(group.clone()),
        None if !args.devices.is_empty() => DeviceSelection::Devices(args.devices.clone()),
        None => DeviceSelection::Authorized,
    };
    RenderRequest {
        report: args.report.clone(),
        account: args.account.clone(),
        user: args.user.clone(),
        devices,
        option: args.option.clone(),
        time_start: args.from,
        time_end: args.to,
        limit: args.limit,
    }
}

/// Render one report to stdout or `--output`.
pub fn run(cli: &Cli, args: &RenderArgs) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let session = Session::load(cli.config.as_deref(), &cwd)?;
    let wanted = render_request(args);

    let store = session.open_store()?;
    let request = session.request(store, &wanted.account, wanted.user.as_deref())?;
    let mut report = session.create_report(&request, &wanted)?;
    report.set_preferred_format(&args.format);

    if args.info {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", report.factory())?;
        writeln!(handle, "  Devices: {}", report.devices())?;
        writeln!(handle, "  {}", report.constraints())?;
        return Ok(ExitCode::Success);
    }

    let (output, count) = match ReportFormat::parse(&args.format) {
        ReportFormat::Html => {
            let (page, count) = presentation::html_page(&mut report, false)?;
            (page.into_bytes(), count)
        }
        _ => {
            let mut out = Vec::new();
            let count = report.write_report(&args.format, &mut out)?;
            (out, count)
        }
    };
    tracing::info!("rendered {} record(s) for {}", count, report.report_name());

    match &args.output {
        Some(path) => std::fs::write(path, &output).map_err(|e| Error::Io {
            path: path.clone(),
            source: e,
        })?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&output)?;
            handle.flush()?;
        }
    }
    Ok(ExitCode::Success)
}
