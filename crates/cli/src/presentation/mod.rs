// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report rendering.
//!
//! [`write_report`] maps a format name onto one of the writers below. Every
//! writer walks the same [`ReportTable`]: header cells bound from the report
//! columns, then body rows and totals pulled from the report kind.

mod callback;
mod csv;
mod html;
mod xls;
mod xml;

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use crate::column::{CellValue, ReportColumn};
use crate::data::ReportData;
use crate::error::{Error, Result};
use crate::template::{ColumnCatalog, RowType};

pub use html::{filter_text, html_filter, html_page};
pub use xml::{end_tag, report_url, start_tag, xml_filter};

/// Spaces per nesting level in HTML and XML output.
pub const INDENT: usize = 3;

pub const NO_DATA_MESSAGE: &str = "This report contains no data";
pub const PARTIAL_MESSAGE: &str =
    "This report has reached it's record display limit and may only contain a portion of the possible data";

/// Output formats a report can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Html,
    Xml,
    Soap,
    Url,
    Email,
    Ehtml,
    Csv,
    Txt,
    Xls,
    Xlsx,
    Callback,
}

impl ReportFormat {
    /// Trimmed and case-insensitive; blank or unknown names are HTML.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "xml" => ReportFormat::Xml,
            "soap" | "soapxml" => ReportFormat::Soap,
            "url" => ReportFormat::Url,
            "email" => ReportFormat::Email,
            "ehtml" => ReportFormat::Ehtml,
            "csv" => ReportFormat::Csv,
            "txt" => ReportFormat::Txt,
            "xls" => ReportFormat::Xls,
            "xlsx" => ReportFormat::Xlsx,
            "callback" => ReportFormat::Callback,
            _ => ReportFormat::Html,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Xml => "xml",
            ReportFormat::Soap => "soapxml",
            ReportFormat::Url => "url",
            ReportFormat::Email => "email",
            ReportFormat::Ehtml => "ehtml",
            ReportFormat::Csv => "csv",
            ReportFormat::Txt => "txt",
            ReportFormat::Xls => "xls",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Callback => "callback",
        }
    }

    /// Formats written by the XML writer.
    pub fn is_xml(&self) -> bool {
        matches!(
            self,
            ReportFormat::Xml
                | ReportFormat::Soap
                | ReportFormat::Url
                | ReportFormat::Email
                | ReportFormat::Ehtml
        )
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ReportFormat::Html => "text/html",
            ReportFormat::Csv => "text/csv",
            ReportFormat::Txt => "text/plain",
            ReportFormat::Xls => "application/vnd.ms-excel",
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Callback => "application/octet-stream",
            _ => "text/xml",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `report` in `format`, returning the number of detail records.
pub fn write_report(format: &str, report: &mut ReportData, out: &mut dyn Write) -> Result<usize> {
    let format = ReportFormat::parse(format);
    tracing::debug!("writing report '{}' as {}", report.report_name(), format);
    let mut table = ReportTable::new();
    match format {
        ReportFormat::Html => html::write_html(&mut table, report, false, out),
        ReportFormat::Csv | ReportFormat::Txt => csv::write_csv(&mut table, report, out),
        ReportFormat::Xls | ReportFormat::Xlsx => {
            xls::write_xls(&mut table, report, format == ReportFormat::Xlsx, out)
        }
        ReportFormat::Callback => callback::write_callback(&mut table, report),
        _ => xml::write_xml(&mut table, report, format, out),
    }
}

pub(crate) fn write_str(out: &mut dyn Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).map_err(Error::render)
}

/// A header cell for a column bound to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Index into the report's columns.
    pub column: usize,
    /// Position among the bound columns.
    pub position: usize,
    pub field: String,
    pub title: String,
    pub col_span: usize,
    pub sortable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyCell {
    pub column: usize,
    pub position: usize,
    pub field: String,
    pub value: CellValue,
    pub col_span: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyRow {
    /// Row index within its section.
    pub index: usize,
    pub row_type: RowType,
    /// Set for rows read from the totals section.
    pub is_totals: bool,
    pub css_class: Option<String>,
    pub cells: Vec<BodyCell>,
}

impl BodyRow {
    pub fn is_total(&self) -> bool {
        self.is_totals || self.row_type != RowType::Detail
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BodyResult {
    /// Detail rows written.
    pub count: usize,
    pub partial: bool,
}

/// Binds report columns to the layout's templates for one render.
///
/// Bindings are looked up once per column key and reused for every row.
#[derive(Debug, Default)]
pub struct ReportTable {
    bindings: HashMap<String, Option<String>>,
}

impl ReportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template field name bound to `column`, or `None` when the layout has none.
    pub fn field_name(&mut self, catalog: &dyn ColumnCatalog, column: &ReportColumn) -> Option<String> {
        let key = column.key_name();
        if let Some(found) = self.bindings.get(&key) {
            return found.clone();
        }
        let found = catalog.field_name(column.name());
        if found.is_none() {
            tracing::debug!("Report column template not found: {}", key);
        }
        self.bindings.insert(key, found.clone());
        found
    }

    fn bound_columns(&mut self, report: &ReportData) -> Result<Vec<(usize, String)>> {
        if report.columns().is_empty() {
            return Err(Error::Validation("No report columns defined".to_string()));
        }
        let catalog = report.layout().catalog();
        Ok(report
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| self.field_name(catalog, c).map(|f| (i, f)))
            .collect())
    }

    /// Header cells for the bound columns, titles expanded.
    pub fn header_cells(&mut self, report: &ReportData) -> Result<Vec<HeaderCell>> {
        let catalog = report.layout().catalog();
        let sortable = report.factory().is_sortable();
        let bound = self.bound_columns(report)?;
        Ok(bound
            .into_iter()
            .enumerate()
            .map(|(position, (i, field))| {
                let column = &report.columns()[i];
                let title = match column.title() {
                    Some(title) => title.to_string(),
                    None => catalog
                        .column_title(column.name(), report, column)
                        .unwrap_or_default(),
                };
                HeaderCell {
                    column: i,
                    position,
                    field,
                    title: report.expand_header_text(&title),
                    col_span: column.col_span(),
                    sortable: sortable && column.is_sortable(),
                }
            })
            .collect())
    }

    /// Walk body rows, then totals when `totals` is set, handing each to `emit`.
    pub fn walk_body(
        &mut self,
        report: &ReportData,
        totals: bool,
        emit: &mut dyn FnMut(&BodyRow) -> Result<()>,
    ) -> Result<BodyResult> {
        let bound = self.bound_columns(report)?;

        // Subtotal rows in the body count toward the limit like detail rows.
        let mut count = 0;
        for (index, row) in report.body_rows()?.enumerate() {
            emit(&body_row(report, &bound, index, false, row.as_ref()))?;
            count += 1;
        }
        let partial = count > 0 && over_limit(report, count);

        if totals {
            if let Some(rows) = report.totals_rows()? {
                for (index, row) in rows.enumerate() {
                    emit(&body_row(report, &bound, index, true, row.as_ref()))?;
                }
            }
        }
        Ok(BodyResult { count, partial })
    }
}

fn body_row(
    report: &ReportData,
    bound: &[(usize, String)],
    index: usize,
    is_totals: bool,
    row: &dyn crate::template::DbDataRow,
) -> BodyRow {
    let cells = bound
        .iter()
        .enumerate()
        .map(|(position, (i, field))| {
            let column = &report.columns()[*i];
            let mut value = row.db_value(&column.key_name(), index, report, column);
            if value.is_blank() && !column.blank_fill().is_empty() {
                value = column.blank();
            }
            BodyCell {
                column: *i,
                position,
                field: field.clone(),
                value,
                col_span: column.col_span(),
            }
        })
        .collect();
    BodyRow {
        index,
        row_type: row.row_type(),
        is_totals,
        css_class: row.css_class(),
        cells,
    }
}

/// True when `count` rows suggest the report was cut short.
///
/// Either the display limit was reached, or some device returned as many
/// records as the selection limit allowed.
pub fn over_limit(report: &ReportData, count: usize) -> bool {
    let mut partial = false;
    let report_limit = report.report_limit();
    if report_limit > 0 && count as i64 >= report_limit {
        tracing::info!("Partial report data (RecordCount): {} >= {}", count, report_limit);
        partial = true;
    }
    let selection_limit = report.selection_limit();
    let max = report.max_event_count();
    if selection_limit > 10 && max as i64 >= selection_limit {
        tracing::info!(
            "Partial report data (maxSelectionCount): {} >= {}",
            max,
            selection_limit
        );
        partial = true;
    }
    partial
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
