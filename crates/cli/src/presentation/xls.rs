// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Spreadsheet output.

use std::io::Write;

use super::{NO_DATA_MESSAGE, PARTIAL_MESSAGE, ReportTable};
use crate::column::CellValue;
use crate::data::ReportData;
use crate::error::Result;
use crate::spreadsheet::ReportSpreadsheet;
use crate::template::RowType;

/// Header column width, in characters.
const COLUMN_WIDTH: f64 = 20.0;

pub(super) fn write_xls(
    table: &mut ReportTable,
    report: &ReportData,
    xlsx: bool,
    out: &mut dyn Write,
) -> Result<usize> {
    let sheet = ReportSpreadsheet::new(xlsx, report.report_name());
    write_sheet(table, report, sheet, out)
}

/// Fill `sheet` and write it, returning the detail count or 0 if nothing was written.
pub(super) fn write_sheet(
    table: &mut ReportTable,
    report: &ReportData,
    mut sheet: ReportSpreadsheet,
    out: &mut dyn Write,
) -> Result<usize> {
    if !sheet.is_valid() {
        return Ok(0);
    }

    sheet.set_header_title(&report.report_title())?;
    sheet.set_header_subtitle(&report.report_subtitle())?;
    for cell in table.header_cells(report)? {
        sheet.add_header_column(&cell.title.replace('\n', " "), COLUMN_WIDTH)?;
    }
    sheet.increment_row();

    let result = table.walk_body(report, true, &mut |row| {
        for cell in &row.cells {
            match row.row_type {
                _ if row.is_totals => sheet.add_total_column(&cell.value)?,
                RowType::Detail => sheet.add_body_column(&cell.value)?,
                RowType::Subtotal => sheet.add_subtotal_column(&cell.value)?,
                RowType::Total => sheet.add_total_column(&cell.value)?,
            }
        }
        sheet.increment_row();
        Ok(())
    })?;

    if result.count == 0 {
        sheet.add_body_column(&CellValue::text(NO_DATA_MESSAGE))?;
    } else if result.partial {
        sheet.add_body_column(&CellValue::text(PARTIAL_MESSAGE))?;
    }

    if sheet.write(out)? {
        Ok(result.count)
    } else {
        Ok(0)
    }
}

#[cfg(test)]
#[path = "xls_tests.rs"]
mod tests;
