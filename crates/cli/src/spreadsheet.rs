// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Spreadsheet output: a row/column cursor over a workbook backend.

use std::io::Write;

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};

use crate::column::CellValue;
use crate::error::{Error, Result};

/// Excel's sheet name limit.
const MAX_SHEET_NAME: usize = 31;

/// How a cell is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Title,
    Subtitle,
    Header,
    Body,
    Subtotal,
    Total,
}

/// Storage for the cells of one sheet.
pub trait SpreadsheetBackend {
    fn set_column_width(&mut self, col: u16, width: f64) -> Result<()>;

    fn write_text(&mut self, row: u32, col: u16, text: &str, style: CellStyle) -> Result<()>;

    fn write_number(&mut self, row: u32, col: u16, value: f64, style: CellStyle) -> Result<()>;

    /// Serialized workbook.
    fn save(&mut self) -> Result<Vec<u8>>;
}

fn xlsx_error(e: XlsxError) -> Error {
    Error::Render(format!("spreadsheet: {}", e))
}

/// Sheet name with the characters Excel rejects replaced.
pub fn sheet_name(name: &str) -> String {
    let name: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    if name.is_empty() {
        "Report".to_string()
    } else {
        name
    }
}

/// XLSX workbook with a single sheet.
pub struct XlsxBackend {
    workbook: Workbook,
}

impl XlsxBackend {
    pub fn new(name: &str) -> Result<Self> {
        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .set_name(sheet_name(name))
            .map_err(xlsx_error)?;
        Ok(Self { workbook })
    }

    fn format(style: CellStyle) -> Format {
        match style {
            CellStyle::Title => Format::new().set_bold().set_font_size(14),
            CellStyle::Subtitle => Format::new().set_italic(),
            CellStyle::Header => Format::new()
                .set_bold()
                .set_border(FormatBorder::Thin)
                .set_background_color(Color::RGB(0xCCCCCC)),
            CellStyle::Body => Format::new(),
            CellStyle::Subtotal => Format::new().set_bold(),
            CellStyle::Total => Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xEEEEEE)),
        }
    }
}

impl SpreadsheetBackend for XlsxBackend {
    fn set_column_width(&mut self, col: u16, width: f64) -> Result<()> {
        let sheet = self.workbook.worksheet_from_index(0).map_err(xlsx_error)?;
        sheet.set_column_width(col, width).map_err(xlsx_error)?;
        Ok(())
    }

    fn write_text(&mut self, row: u32, col: u16, text: &str, style: CellStyle) -> Result<()> {
        let sheet = self.workbook.worksheet_from_index(0).map_err(xlsx_error)?;
        sheet
            .write_string_with_format(row, col, text, &Self::format(style))
            .map_err(xlsx_error)?;
        Ok(())
    }

    fn write_number(&mut self, row: u32, col: u16, value: f64, style: CellStyle) -> Result<()> {
        let sheet = self.workbook.worksheet_from_index(0).map_err(xlsx_error)?;
        sheet
            .write_number_with_format(row, col, value, &Self::format(style))
            .map_err(xlsx_error)?;
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        self.workbook.save_to_buffer().map_err(xlsx_error)
    }
}

/// Writes a report into a sheet one cell at a time.
///
/// Cells go left to right on the current row; [`increment_row`] moves to the
/// start of the next one. A sheet without a backend accepts every call and
/// writes nothing.
///
/// [`increment_row`]: ReportSpreadsheet::increment_row
pub struct ReportSpreadsheet {
    backend: Option<Box<dyn SpreadsheetBackend>>,
    row: u32,
    col: u16,
}

impl ReportSpreadsheet {
    /// An XLSX sheet, or an invalid sheet for legacy XLS.
    pub fn new(xlsx: bool, name: &str) -> Self {
        let backend: Option<Box<dyn SpreadsheetBackend>> = if !xlsx {
            tracing::warn!("XLS spreadsheets are not supported");
            None
        } else {
            match XlsxBackend::new(name) {
                Ok(backend) => Some(Box::new(backend)),
                Err(e) => {
                    tracing::error!("Unable to create spreadsheet: {}", e);
                    None
                }
            }
        };
        Self {
            backend,
            row: 0,
            col: 0,
        }
    }

    pub fn with_backend(backend: Box<dyn SpreadsheetBackend>) -> Self {
        Self {
            backend: Some(backend),
            row: 0,
            col: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.backend.is_some()
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u16 {
        self.col
    }

    fn put(&mut self, value: &CellValue, style: CellStyle) -> Result<()> {
        let (row, col) = (self.row, self.col);
        self.col += 1;
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        match value {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => backend.write_number(row, col, *n, style),
            other => backend.write_text(row, col, other.to_string().trim(), style),
        }
    }

    fn header_line(&mut self, text: &str, style: CellStyle) -> Result<()> {
        if !text.trim().is_empty() {
            self.put(&CellValue::text(text), style)?;
            self.increment_row();
        }
        Ok(())
    }

    /// Title on its own row; blank titles are skipped.
    pub fn set_header_title(&mut self, title: &str) -> Result<()> {
        self.header_line(title, CellStyle::Title)
    }

    pub fn set_header_subtitle(&mut self, subtitle: &str) -> Result<()> {
        self.header_line(subtitle, CellStyle::Subtitle)
    }

    pub fn add_header_column(&mut self, title: &str, width: f64) -> Result<()> {
        let col = self.col;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_column_width(col, width)?;
        }
        self.put(&CellValue::text(title), CellStyle::Header)
    }

    pub fn add_body_column(&mut self, value: &CellValue) -> Result<()> {
        self.put(value, CellStyle::Body)
    }

    pub fn add_subtotal_column(&mut self, value: &CellValue) -> Result<()> {
        self.put(value, CellStyle::Subtotal)
    }

    pub fn add_total_column(&mut self, value: &CellValue) -> Result<()> {
        self.put(value, CellStyle::Total)
    }

    pub fn increment_row(&mut self) {
        self.row += 1;
        self.col = 0;
    }

    /// Write the workbook to `out`. Returns false when there is no backend.
    pub fn write(&mut self, out: &mut dyn Write) -> Result<bool> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(false);
        };
        let bytes = backend.save()?;
        out.write_all(&bytes).map_err(Error::render)?;
        Ok(true)
    }
}

impl std::fmt::Debug for ReportSpreadsheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportSpreadsheet")
            .field("valid", &self.is_valid())
            .field("row", &self.row)
            .field("col", &self.col)
            .finish()
    }
}

#[cfg(test)]
#[path = "spreadsheet_tests.rs"]
mod tests;
