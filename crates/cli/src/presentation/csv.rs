// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Comma separated output. Totals and banners are left out.

use std::io::Write;

use ::csv::{QuoteStyle, WriterBuilder};

use super::ReportTable;
use crate::data::ReportData;
use crate::error::{Error, Result};

/// Report property choosing column titles over field names for the header.
pub const PROP_CSV_HEADER_DESCRIPTIONS: &str = "csvColumnHeaderDescriptions";

fn csv_error(err: ::csv::Error) -> Error {
    Error::Render(err.to_string())
}

/// Every field is trimmed and quoted, header included.
pub(super) fn write_csv(
    table: &mut ReportTable,
    report: &ReportData,
    out: &mut dyn Write,
) -> Result<usize> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .flexible(true)
        .from_writer(out);

    let use_titles = report.property_bool(PROP_CSV_HEADER_DESCRIPTIONS, false);
    let header: Vec<String> = table
        .header_cells(report)?
        .into_iter()
        .map(|cell| {
            if use_titles {
                cell.title.replace('\n', " ").trim().to_string()
            } else {
                cell.field.trim().to_string()
            }
        })
        .collect();
    writer.write_record(&header).map_err(csv_error)?;

    let result = table.walk_body(report, false, &mut |row| {
        writer
            .write_record(row.cells.iter().map(|cell| cell.value.to_string().trim().to_string()))
            .map_err(csv_error)
    })?;
    writer.flush().map_err(Error::render)?;
    Ok(result.count)
}

#[cfg(test)]
#[path = "csv_tests.rs"]
mod tests;
