// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Columns over individual GPS events.

use std::sync::LazyLock;

use crate::column::{CellValue, ColumnValue, ReportColumn};
use crate::data::ReportData;
use crate::model::{EventRecord, SpeedUnits, status_description};
use crate::template::{ColumnCatalog, DataColumnTemplate, DataRowTemplate};

pub const CLASS_NAME: &str = "fleetreport.reports.EventDataLayout";

/// An event plus the device details shown beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub event: EventRecord,
    pub device_desc: String,
    /// Matching events for the device, when the report counts them.
    pub count: Option<u64>,
}

impl EventRow {
    pub fn new(event: EventRecord, device_desc: &str) -> Self {
        Self {
            event,
            device_desc: device_desc.to_string(),
            count: None,
        }
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

type Col = DataColumnTemplate<EventRow>;

/// Units from the column argument (`speed:kph`), else the account's.
fn units(report: &ReportData, column: &ReportColumn) -> SpeedUnits {
    match column.arg().trim().to_ascii_lowercase().as_str() {
        "mph" => SpeedUnits::Mph,
        "kph" | "kmh" => SpeedUnits::Kph,
        _ => report.request().speed_units(),
    }
}

fn distance_label(units: SpeedUnits) -> &'static str {
    match units {
        SpeedUnits::Mph => "Miles",
        SpeedUnits::Kph => "Km",
    }
}

fn decimal(value: f64, places: usize) -> CellValue {
    CellValue::Text(format!("{:.*}", places, value))
}

fn columns() -> Vec<(Col, &'static [&'static str])> {
    vec![
        (
            Col::new("index", |i, _, _, _| Ok(CellValue::from(i as i64 + 1))).with_title("#"),
            &[],
        ),
        (
            Col::new("deviceId", |_, _, _, row| Ok(CellValue::text(&row.event.device_id)))
                .with_title("Device ID"),
            &[],
        ),
        (
            Col::new("deviceDesc", |_, _, _, row| Ok(CellValue::text(&row.device_desc)))
                .with_title("Device"),
            &["device"],
        ),
        (
            Col::new("date", |_, report, _, row| {
                let pattern = report.layout().date_format();
                Ok(CellValue::Text(report.zone().format(row.event.timestamp, pattern)))
            })
            .with_title("Date"),
            &[],
        ),
        (
            Col::new("time", |_, report, _, row| {
                let pattern = report.layout().time_format();
                Ok(CellValue::Text(report.zone().format(row.event.timestamp, pattern)))
            })
            .with_title("Time"),
            &[],
        ),
        (
            Col::new("dateTime", |_, report, _, row| {
                let pattern = report.layout().date_time_format();
                let text = report.zone().format(row.event.timestamp, &pattern);
                Ok(ColumnValue::new(text)
                    .set_sort_key(row.event.timestamp)
                    .into())
            })
            .with_title("Date/Time"),
            &[],
        ),
        (
            Col::new("timestamp", |_, _, _, row| Ok(CellValue::from(row.event.timestamp)))
                .with_title("Timestamp"),
            &[],
        ),
        (
            Col::new("statusCode", |_, _, _, row| {
                Ok(CellValue::Text(format!("0x{:04X}", row.event.status_code)))
            })
            .with_title("Status Code"),
            &[],
        ),
        (
            Col::new("status", |_, _, _, row| {
                Ok(ColumnValue::new(status_description(row.event.status_code))
                    .set_sort_key(row.event.status_code)
                    .into())
            })
            .with_title("Status"),
            &["statusDesc"],
        ),
        (
            Col::new("latitude", |_, _, _, row| Ok(decimal(row.event.latitude, 5)))
                .with_title("Latitude"),
            &["lat"],
        ),
        (
            Col::new("longitude", |_, _, _, row| Ok(decimal(row.event.longitude, 5)))
                .with_title("Longitude"),
            &["lon"],
        ),
        (
            Col::new("geoPoint", |_, _, _, row| {
                let ev = &row.event;
                if !ev.is_valid_gps() {
                    return Ok(CellValue::Empty);
                }
                Ok(CellValue::Text(format!("{:.5}/{:.5}", ev.latitude, ev.longitude)))
            })
            .with_title("Lat/Lon"),
            &["latlon"],
        ),
        (
            Col::new("speed", |_, report, column, row| {
                let units = units(report, column);
                Ok(decimal(units.from_kph(row.event.speed_kph), 1))
            })
            .with_title("Speed")
            .with_title_fn(|report, column| format!("Speed\\n({})", units(report, column))),
            &[],
        ),
        (
            Col::new("heading", |_, _, _, row| Ok(CellValue::from(row.event.heading.round())))
                .with_title("Heading"),
            &[],
        ),
        (
            Col::new("address", |_, _, _, row| Ok(CellValue::text(row.event.address.trim())))
                .with_title("Address"),
            &[],
        ),
        (
            Col::new("odometer", |_, report, column, row| {
                let units = units(report, column);
                Ok(decimal(units.from_kph(row.event.odometer_km), 1))
            })
            .with_title("Odometer")
            .with_title_fn(|report, column| {
                format!("Odometer\\n({})", distance_label(units(report, column)))
            }),
            &[],
        ),
        (
            Col::new("count", |_, _, _, row| {
                Ok(row.count.map_or(CellValue::Empty, |n| CellValue::from(n as i64)))
            })
            .with_title("Count"),
            &[],
        ),
    ]
}

static TEMPLATE: LazyLock<DataRowTemplate<EventRow>> = LazyLock::new(|| {
    let mut template = DataRowTemplate::new();
    for (column, aliases) in columns() {
        template.add_column_template(column, aliases);
    }
    template
});

pub fn template() -> &'static DataRowTemplate<EventRow> {
    &TEMPLATE
}

pub fn catalog() -> &'static dyn ColumnCatalog {
    template()
}

#[cfg(test)]
#[path = "event_layout_tests.rs"]
mod tests;
