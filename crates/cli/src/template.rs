// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Named column templates and the row adapters that feed them.
//!
//! A [`DataRowTemplate`] maps logical column keys to value extractors over a
//! typed row. [`DbDataRow`] erases the row type so the presentation layer can
//! walk any report's rows the same way.

use std::collections::HashMap;
use std::sync::Arc;

use crate::column::{CellValue, ReportColumn};
use crate::data::ReportData;
use crate::error::Result;

/// Cell returned when a column extractor fails.
pub const ERROR_VALUE: &str = "!!!";

/// Classification of a row within a report body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowType {
    #[default]
    Detail,
    Subtotal,
    Total,
}

/// Lookup key for a column: argument stripped, trimmed, lowercased.
pub fn normalize_key(key: &str) -> String {
    let key = match key.split_once(':') {
        Some((name, _)) => name,
        None => key,
    };
    key.trim().to_lowercase()
}

type ValueFn<R> =
    Box<dyn Fn(usize, &ReportData, &ReportColumn, &R) -> Result<CellValue> + Send + Sync>;
type TitleFn = Box<dyn Fn(&ReportData, &ReportColumn) -> String + Send + Sync>;

/// Extracts one named column from a row of type `R`.
pub struct DataColumnTemplate<R> {
    key_name: String,
    default_arg: String,
    title: String,
    title_fn: Option<TitleFn>,
    value: ValueFn<R>,
}

impl<R> DataColumnTemplate<R> {
    pub fn new<F>(key: &str, value: F) -> Self
    where
        F: Fn(usize, &ReportData, &ReportColumn, &R) -> Result<CellValue> + Send + Sync + 'static,
    {
        Self {
            key_name: key.trim().to_string(),
            default_arg: String::new(),
            title: String::new(),
            title_fn: None,
            value: Box::new(value),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Compute the title per report and column (e.g. to show units).
    pub fn with_title_fn<F>(mut self, title: F) -> Self
    where
        F: Fn(&ReportData, &ReportColumn) -> String + Send + Sync + 'static,
    {
        self.title_fn = Some(Box::new(title));
        self
    }

    pub fn with_default_arg(mut self, arg: &str) -> Self {
        self.default_arg = arg.to_string();
        self
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn default_arg(&self) -> &str {
        &self.default_arg
    }

    /// Title with no report context.
    pub fn default_title(&self) -> &str {
        &self.title
    }

    pub fn title(&self, report: &ReportData, column: &ReportColumn) -> String {
        match &self.title_fn {
            Some(f) => f(report, column),
            None => self.title.clone(),
        }
    }

    pub fn column_value(
        &self,
        row_index: usize,
        report: &ReportData,
        column: &ReportColumn,
        row: &R,
    ) -> Result<CellValue> {
        (self.value)(row_index, report, column, row)
    }
}

impl<R> std::fmt::Debug for DataColumnTemplate<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataColumnTemplate")
            .field("key_name", &self.key_name)
            .field("title", &self.title)
            .finish()
    }
}

/// Registry of column templates for one row type.
pub struct DataRowTemplate<R> {
    columns: HashMap<String, Arc<DataColumnTemplate<R>>>,
    row_type: fn(&R) -> RowType,
    css_class: fn(&R) -> Option<String>,
    raw_field: Option<fn(&R, &str) -> Option<String>>,
}

impl<R> Default for DataRowTemplate<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> DataRowTemplate<R> {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
            row_type: |_| RowType::Detail,
            css_class: |_| None,
            raw_field: None,
        }
    }

    pub fn with_row_type(mut self, f: fn(&R) -> RowType) -> Self {
        self.row_type = f;
        self
    }

    pub fn with_css_class(mut self, f: fn(&R) -> Option<String>) -> Self {
        self.css_class = f;
        self
    }

    /// Field lookup used for keys that have no template.
    pub fn with_raw_field(mut self, f: fn(&R, &str) -> Option<String>) -> Self {
        self.raw_field = Some(f);
        self
    }

    fn insert(&mut self, key: &str, column: &Arc<DataColumnTemplate<R>>) -> bool {
        if key.trim().is_empty() {
            tracing::warn!("Invalid column options: key={}", key);
            return true;
        }
        let k = normalize_key(key);
        let fresh = !self.columns.contains_key(&k);
        if !fresh {
            tracing::warn!("Report layout column key already defined: {}", k);
        }
        self.columns.insert(k, Arc::clone(column));
        fresh
    }

    /// Register a column under its own key and any aliases.
    ///
    /// Returns false when a key was already taken; the new template replaces it.
    pub fn add_column_template(&mut self, column: DataColumnTemplate<R>, aliases: &[&str]) -> bool {
        let column = Arc::new(column);
        let mut ok = self.insert(&column.key_name.clone(), &column);
        for alias in aliases {
            ok &= self.insert(alias, &column);
        }
        ok
    }

    pub fn column_template(&self, key: &str) -> Option<&DataColumnTemplate<R>> {
        self.columns.get(&normalize_key(key)).map(Arc::as_ref)
    }

    pub fn has_column_template(&self, key: &str) -> bool {
        self.columns.contains_key(&normalize_key(key))
    }

    pub fn row_type(&self, row: &R) -> RowType {
        (self.row_type)(row)
    }

    pub fn css_class(&self, row: &R) -> Option<String> {
        (self.css_class)(row).filter(|c| !c.trim().is_empty())
    }

    /// Value of `key` for `row`.
    ///
    /// Keys without a template fall back to the row's raw field of that name.
    pub fn field_value(
        &self,
        key: &str,
        row_index: usize,
        report: &ReportData,
        column: &ReportColumn,
        row: &R,
    ) -> CellValue {
        if let Some(template) = self.column_template(key) {
            return match template.column_value(row_index, report, column, row) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Error getting report column value: {}", e);
                    CellValue::text(ERROR_VALUE)
                }
            };
        }
        match self.raw_field.and_then(|f| f(row, key)) {
            Some(raw) => CellValue::Text(raw.trim().to_string()),
            None => CellValue::Empty,
        }
    }
}

/// Column lookups that don't depend on the row type.
pub trait ColumnCatalog: Send + Sync {
    fn has_column(&self, key: &str) -> bool;

    /// Key name of the template bound to `key`, as written in output ids.
    fn field_name(&self, key: &str) -> Option<String>;

    /// Title for `column` within `report`, or `None` if no template matches.
    fn column_title(&self, key: &str, report: &ReportData, column: &ReportColumn)
    -> Option<String>;

    /// `(key, title)` pairs sorted by key, titles without report context.
    fn column_titles(&self) -> Vec<(String, String)>;
}

impl<R> ColumnCatalog for DataRowTemplate<R>
where
    R: 'static,
{
    fn has_column(&self, key: &str) -> bool {
        self.has_column_template(key)
    }

    fn field_name(&self, key: &str) -> Option<String> {
        self.column_template(key).map(|t| t.key_name().to_string())
    }

    fn column_title(
        &self,
        key: &str,
        report: &ReportData,
        column: &ReportColumn,
    ) -> Option<String> {
        self.column_template(key).map(|t| t.title(report, column))
    }

    fn column_titles(&self) -> Vec<(String, String)> {
        let mut titles: Vec<(String, String)> = self
            .columns
            .iter()
            .map(|(k, t)| (k.clone(), t.default_title().to_string()))
            .collect();
        titles.sort();
        titles
    }
}

/// A report row with its type erased.
pub trait DbDataRow {
    fn db_value(
        &self,
        key: &str,
        row_index: usize,
        report: &ReportData,
        column: &ReportColumn,
    ) -> CellValue;

    fn row_type(&self) -> RowType {
        RowType::Detail
    }

    fn css_class(&self) -> Option<String> {
        None
    }
}

pub type DataIterator<'a> = Box<dyn Iterator<Item = Box<dyn DbDataRow + 'a>> + 'a>;

/// Pairs a row with the template that reads it.
pub struct TemplateRow<'a, R> {
    template: &'a DataRowTemplate<R>,
    row: R,
}

impl<'a, R> TemplateRow<'a, R> {
    pub fn new(template: &'a DataRowTemplate<R>, row: R) -> Self {
        Self { template, row }
    }

    pub fn row(&self) -> &R {
        &self.row
    }
}

impl<R> DbDataRow for TemplateRow<'_, R> {
    fn db_value(
        &self,
        key: &str,
        row_index: usize,
        report: &ReportData,
        column: &ReportColumn,
    ) -> CellValue {
        self.template
            .field_value(key, row_index, report, column, &self.row)
    }

    fn row_type(&self) -> RowType {
        self.template.row_type(&self.row)
    }

    fn css_class(&self) -> Option<String> {
        self.template.css_class(&self.row)
    }
}

/// Iterate `rows` through `template`.
pub fn template_rows<'a, R: 'a>(template: &'a DataRowTemplate<R>, rows: Vec<R>) -> DataIterator<'a> {
    Box::new(
        rows.into_iter()
            .map(move |row| Box::new(TemplateRow::new(template, row)) as Box<dyn DbDataRow + 'a>),
    )
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
