// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report output captured as plain values for programmatic use.

use std::fmt;

use crate::data::ReportData;
use crate::error::{Error, Result};

/// Report property choosing column titles over field names for the headers.
pub const PROP_CALLBACK_HEADER_DESCRIPTIONS: &str = "callbackColumnHeaderDescriptions";

/// Receives a rendered report as rows of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportCallback {
    report_name: String,
    column_count: usize,
    title: String,
    subtitle: String,
    headers: Option<Vec<String>>,
    body: Vec<Vec<String>>,
    totals: Vec<Vec<String>>,
}

impl ReportCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `report`, clearing anything captured before.
    pub fn set_report(&mut self, report: &ReportData) -> Result<()> {
        if report.columns().is_empty() {
            return Err(Error::Validation("No report columns defined".to_string()));
        }
        *self = Self {
            report_name: report.report_name().to_string(),
            column_count: report.column_count(),
            ..Self::default()
        };
        Ok(())
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_subtitle(&mut self, subtitle: &str) {
        self.subtitle = subtitle.to_string();
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.headers = Some(headers);
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn add_body_row(&mut self, row: Vec<String>) {
        self.body.push(row);
    }

    pub fn body(&self) -> &[Vec<String>] {
        &self.body
    }

    pub fn add_totals_row(&mut self, row: Vec<String>) {
        self.totals.push(row);
    }

    pub fn totals(&self) -> &[Vec<String>] {
        &self.totals
    }

    /// Drop captured rows, keeping the report binding.
    pub fn clear(&mut self) {
        self.title.clear();
        self.subtitle.clear();
        self.headers = None;
        self.body.clear();
        self.totals.clear();
    }
}

fn display_value(value: &str) -> String {
    value.trim().replace('\n', "\\n")
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[Vec<String>]) -> fmt::Result {
    for row in rows {
        let values: Vec<String> = row.iter().map(|v| display_value(v)).collect();
        writeln!(f, "  {}", values.join(","))?;
    }
    Ok(())
}

impl fmt::Display for ReportCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report Title   : {}", display_value(&self.title))?;
        writeln!(f, "Report Subtitle: {}", display_value(&self.subtitle))?;
        match &self.headers {
            Some(headers) => writeln!(f, "Report Headers : {}", headers.join(","))?,
            None => writeln!(f, "Report Headers : null")?,
        }
        writeln!(f, "Report Body    : ")?;
        write_rows(f, &self.body)?;
        writeln!(f, "Report Totals  : ")?;
        write_rows(f, &self.totals)
    }
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;
