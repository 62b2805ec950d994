// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Render fleet event reports from XML report definitions
#[derive(Parser)]
#[command(name = "fleetreport")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "FLEETREPORT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render one report
    Render(RenderArgs),
    /// List the reports in the definition
    List(ListArgs),
    /// List the columns a report's layout provides
    Columns(ColumnsArgs),
    /// Parse the report definition and show problems
    Check,
}

#[derive(clap::Args, Default)]
pub struct RenderArgs {
    /// Report name
    #[arg(value_name = "REPORT")]
    pub report: String,

    /// Account to report on
    #[arg(long, value_name = "ID")]
    pub account: String,

    /// Device to include (repeatable)
    #[arg(long = "device", value_name = "ID")]
    pub devices: Vec<String>,

    /// Device group to include
    #[arg(long, value_name = "ID")]
    pub group: Option<String>,

    /// User the report runs as
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,

    /// Output format (html, xml, soapxml, url, email, ehtml, csv, txt, xls, xlsx)
    #[arg(short, long, default_value = "html")]
    pub format: String,

    /// Start of the time range (epoch seconds)
    #[arg(long, value_name = "TS")]
    pub from: Option<i64>,

    /// End of the time range (epoch seconds)
    #[arg(long, value_name = "TS")]
    pub to: Option<i64>,

    /// Selection and report limit
    #[arg(long, value_name = "N")]
    pub limit: Option<i64>,

    /// Report option name
    #[arg(long, value_name = "NAME")]
    pub option: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show the report factory and constraints instead of rendering
    #[arg(long)]
    pub info: bool,
}

#[derive(clap::Args, Default)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Default)]
pub struct ColumnsArgs {
    /// Report name
    #[arg(value_name = "REPORT")]
    pub report: String,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
