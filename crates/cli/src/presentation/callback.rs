// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rows pushed into the report's [`ReportCallback`] instead of a stream.

use super::{BodyRow, ReportTable};
use crate::callback::{PROP_CALLBACK_HEADER_DESCRIPTIONS, ReportCallback};
use crate::data::ReportData;
use crate::error::Result;

/// One value per report column; columns without a template stay empty.
fn row_values(row: &BodyRow, columns: usize) -> Vec<String> {
    let mut values = vec![String::new(); columns];
    for cell in &row.cells {
        values[cell.column] = cell.value.to_string();
    }
    values
}

fn fill(table: &mut ReportTable, report: &ReportData, cb: &mut ReportCallback) -> Result<usize> {
    cb.clear();
    cb.set_title(&report.report_title());
    cb.set_subtitle(&report.report_subtitle());

    let use_titles = report.property_bool(PROP_CALLBACK_HEADER_DESCRIPTIONS, true);
    let mut headers: Vec<String> = report.columns().iter().map(|c| c.key_name()).collect();
    for cell in table.header_cells(report)? {
        headers[cell.column] = if use_titles { cell.title } else { cell.field };
    }
    cb.set_headers(headers);

    let columns = report.column_count();
    let result = table.walk_body(report, true, &mut |row| {
        if row.is_totals {
            cb.add_totals_row(row_values(row, columns));
        } else {
            cb.add_body_row(row_values(row, columns));
        }
        Ok(())
    })?;
    Ok(result.count)
}

/// Capture the report into its callback. Returns 0 when none is set.
pub(super) fn write_callback(table: &mut ReportTable, report: &mut ReportData) -> Result<usize> {
    let Some(mut cb) = report.take_callback() else {
        return Ok(0);
    };
    let count = fill(table, report, &mut cb);
    report.restore_callback(Some(cb));
    count
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;
