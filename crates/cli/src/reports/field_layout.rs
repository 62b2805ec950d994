// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Columns over rows of named values computed by the report.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::column::CellValue;
use crate::template::{ColumnCatalog, DataColumnTemplate, DataRowTemplate, RowType};

pub const CLASS_NAME: &str = "fleetreport.reports.FieldLayout";

pub const FIELD_DEVICE_ID: &str = "deviceId";
pub const FIELD_DEVICE_DESC: &str = "deviceDesc";
pub const FIELD_COUNT: &str = "count";

/// A row of named values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRow {
    row_type: RowType,
    values: BTreeMap<String, CellValue>,
}

impl FieldRow {
    pub fn new(row_type: RowType) -> Self {
        Self {
            row_type,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<CellValue>) -> Self {
        self.values.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    pub fn row_type(&self) -> RowType {
        self.row_type
    }

    /// Value for `key`, case-insensitive.
    pub fn value(&self, key: &str) -> CellValue {
        self.values
            .get(&key.to_ascii_lowercase())
            .cloned()
            .unwrap_or(CellValue::Empty)
    }
}

type Col = DataColumnTemplate<FieldRow>;

fn field(key: &'static str, title: &str) -> Col {
    Col::new(key, move |_, _, _, row| Ok(row.value(key))).with_title(title)
}

static TEMPLATE: LazyLock<DataRowTemplate<FieldRow>> = LazyLock::new(|| {
    let mut template = DataRowTemplate::new()
        .with_row_type(FieldRow::row_type)
        .with_raw_field(|row, key| match row.value(key) {
            CellValue::Empty => None,
            value => Some(value.to_string()),
        });
    let index = Col::new("index", |i, _, _, row| {
        Ok(match row.row_type() {
            RowType::Detail => CellValue::from(i as i64 + 1),
            _ => CellValue::Empty,
        })
    })
    .with_title("#");
    template.add_column_template(index, &[]);
    template.add_column_template(field(FIELD_DEVICE_ID, "Device ID"), &[]);
    template.add_column_template(field(FIELD_DEVICE_DESC, "Device"), &["device"]);
    template.add_column_template(field(FIELD_COUNT, "Count"), &["eventCount"]);
    template
});

pub fn template() -> &'static DataRowTemplate<FieldRow> {
    &TEMPLATE
}

pub fn catalog() -> &'static dyn ColumnCatalog {
    template()
}

#[cfg(test)]
#[path = "field_layout_tests.rs"]
mod tests;
