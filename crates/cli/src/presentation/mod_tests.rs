// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use std::sync::Arc;

use crate::model::{Device, EventRecord, STATUS_LOCATION};
use crate::reports::field_layout::{self, FIELD_COUNT, FIELD_DEVICE_ID, FieldRow};
use crate::request::RequestContext;
use crate::store::MemoryStore;
use crate::template::{DataIterator, template_rows};
use crate::test_utils::{ACCOUNT, DAY_START, account, report, report_with};
use yare::parameterized;

#[parameterized(
    html = { "html", ReportFormat::Html },
    blank = { "  ", ReportFormat::Html },
    unknown = { "pdf", ReportFormat::Html },
    upper_csv = { "CSV", ReportFormat::Csv },
    padded_xml = { " xml ", ReportFormat::Xml },
    soap = { "soapxml", ReportFormat::Soap },
    soap_short = { "SOAP", ReportFormat::Soap },
    ehtml = { "ehtml", ReportFormat::Ehtml },
    xlsx = { "xlsx", ReportFormat::Xlsx },
    callback = { "callback", ReportFormat::Callback },
)]
fn format_names(name: &str, expected: ReportFormat) {
    assert_eq!(ReportFormat::parse(name), expected);
}

#[test]
fn xml_family_shares_the_xml_writer() {
    for format in [
        ReportFormat::Xml,
        ReportFormat::Soap,
        ReportFormat::Url,
        ReportFormat::Email,
        ReportFormat::Ehtml,
    ] {
        assert!(format.is_xml(), "{}", format);
        assert_eq!(format.mime_type(), "text/xml");
    }
    assert!(!ReportFormat::Csv.is_xml());
    assert_eq!(ReportFormat::Csv.mime_type(), "text/csv");
    assert_eq!(ReportFormat::Soap.to_string(), "soapxml");
}

#[test]
fn header_cells_expand_titles() {
    let report = report("EventDetail", &["truck1"]);
    let cells = ReportTable::new().header_cells(&report).unwrap();
    let titles: Vec<&str> = cells.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["#", "Date/Time", "Status", "Speed\n(mph)", "Address"]);
    let fields: Vec<&str> = cells.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["index", "dateTime", "status", "speed", "address"]);
    assert_eq!(cells[4].position, 4);
    assert!(!cells[0].sortable);
}

#[test]
fn column_title_overrides_template_title() {
    let mut report = report("EventDetail", &["truck1"]);
    report.set_columns(vec![
        ReportColumn::new("speed", "kph", Some("Velocity ${speedUnits}")),
        ReportColumn::new("speed", "kph", None),
    ]);
    let cells = ReportTable::new().header_cells(&report).unwrap();
    assert_eq!(cells[0].title, "Velocity mph");
    assert_eq!(cells[1].title, "Speed\n(km/h)");
}

#[test]
fn unbound_columns_are_skipped() {
    let mut report = report("EventDetail", &["truck1"]);
    report.set_columns(vec![
        ReportColumn::new("fuelLevel", "", None),
        ReportColumn::new("address", "", None),
    ]);
    let mut table = ReportTable::new();
    let cells = table.header_cells(&report).unwrap();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].column, 1);
    assert_eq!(cells[0].position, 0);
    let catalog = report.layout().catalog();
    assert_eq!(table.field_name(catalog, &report.columns()[0]), None);
}

#[test]
fn no_columns_is_an_error() {
    let mut report = report("EventDetail", &["truck1"]);
    report.set_columns(Vec::new());
    let err = ReportTable::new().header_cells(&report).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn walk_body_counts_body_rows() {
    let report = report("EventDetail", &["truck1"]);
    let mut rows = Vec::new();
    let result = ReportTable::new()
        .walk_body(&report, true, &mut |row| {
            rows.push(row.clone());
            Ok(())
        })
        .unwrap();
    assert_eq!(result, BodyResult { count: 3, partial: false });
    assert_eq!(rows[0].cells[1].value.to_string(), "2024/01/01 01:00:00");
    assert_eq!(rows[1].cells[2].value.to_string(), "Start");
    assert_eq!(rows[1].cells[3].value.to_string(), "49.7");
    assert_eq!(rows[2].index, 2);
}

/// Per-device rows with a subtotal between them.
struct SubtotalledCounts;

impl crate::data::ReportKind for SubtotalledCounts {
    fn body_rows<'a>(&'a self, _report: &'a ReportData) -> Result<DataIterator<'a>> {
        let rows = vec![
            FieldRow::new(RowType::Detail).with(FIELD_DEVICE_ID, "truck1").with(FIELD_COUNT, 3_i64),
            FieldRow::new(RowType::Subtotal).with(FIELD_COUNT, 3_i64),
            FieldRow::new(RowType::Detail).with(FIELD_DEVICE_ID, "van2").with(FIELD_COUNT, 1_i64),
        ];
        Ok(template_rows(field_layout::template(), rows))
    }
}

#[test]
fn walk_body_counts_subtotal_rows() {
    let base = report("EventCount", &["truck1", "van2"]);
    let mut report = ReportData::new_legacy(
        Arc::clone(base.factory()),
        &crate::test_utils::request(),
        account(),
        None,
        base.devices().clone(),
        Box::new(SubtotalledCounts),
    );
    report.set_columns(vec![
        ReportColumn::new(FIELD_DEVICE_ID, "", None),
        ReportColumn::new(FIELD_COUNT, "", None),
    ]);
    report.constraints_mut().set_report_limit(3);
    let mut types = Vec::new();
    let result = ReportTable::new()
        .walk_body(&report, false, &mut |row| {
            types.push(row.row_type);
            Ok(())
        })
        .unwrap();
    assert_eq!(types, vec![RowType::Detail, RowType::Subtotal, RowType::Detail]);
    assert_eq!(result, BodyResult { count: 3, partial: true });
}

#[test]
fn walk_body_appends_totals_on_request() {
    let report = report("EventCount", &["truck1", "van2"]);
    let mut totals = Vec::new();
    let result = ReportTable::new()
        .walk_body(&report, true, &mut |row| {
            if row.is_totals {
                totals.push(row.clone());
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(result.count, 2);
    assert_eq!(totals.len(), 1);
    assert!(totals[0].is_total());
    assert_eq!(totals[0].cells[2].value.to_string(), "Total");
    assert_eq!(totals[0].cells[3].value.to_string(), "4");

    let mut seen = 0;
    ReportTable::new()
        .walk_body(&report, false, &mut |_| {
            seen += 1;
            Ok(())
        })
        .unwrap();
    assert_eq!(seen, 2);
}

#[test]
fn blank_fill_replaces_empty_cells() {
    let mut report = report("EventCount", &["truck1"]);
    report.set_columns(vec![
        ReportColumn::new("count", "", None),
        ReportColumn::new("index", "", None).with_blank_fill("-"),
    ]);
    let mut total_index = None;
    ReportTable::new()
        .walk_body(&report, true, &mut |row| {
            if row.is_totals {
                total_index = Some(row.cells[1].value.to_string());
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(total_index.as_deref(), Some("-"));
}

#[test]
fn report_limit_marks_partial() {
    let mut report = report("EventDetail", &["truck1"]);
    report.constraints_mut().set_report_limit(2);
    let result = ReportTable::new()
        .walk_body(&report, false, &mut |_| Ok(()))
        .unwrap();
    assert_eq!(result, BodyResult { count: 2, partial: true });
}

#[test]
fn small_selection_limits_never_mark_partial() {
    let mut report = report("EventDetail", &["truck1"]);
    report.constraints_mut().set_selection_limit(3);
    let _ = report.event_data();
    assert!(!over_limit(&report, 3));

    report.constraints_mut().set_selection_limit(11);
    assert!(!over_limit(&report, 3));
}

/// Request over a store where `truck1` has `events` location events.
fn busy_truck(events: i64) -> RequestContext {
    let store = MemoryStore::default()
        .with_account(account())
        .with_device(Device::new(ACCOUNT, "truck1", "Truck One"))
        .with_events((0..events).map(|i| {
            EventRecord::new(ACCOUNT, "truck1", DAY_START + 60 * i, STATUS_LOCATION).at(37.5, -122.25)
        }));
    RequestContext::new(Arc::new(store), account())
}

#[test]
fn reaching_a_large_selection_limit_marks_partial() {
    let request = busy_truck(60);
    let mut report = report_with(&request, "EventDetail", &["truck1"]);
    report.constraints_mut().set_report_limit(-1);
    report.constraints_mut().set_selection_limit(50);
    let result = ReportTable::new()
        .walk_body(&report, false, &mut |_| Ok(()))
        .unwrap();
    assert_eq!(report.max_event_count(), 50);
    assert_eq!(result, BodyResult { count: 50, partial: true });
}

#[test]
fn large_selection_limit_not_reached_is_complete() {
    let request = busy_truck(20);
    let mut report = report_with(&request, "EventDetail", &["truck1"]);
    report.constraints_mut().set_report_limit(-1);
    report.constraints_mut().set_selection_limit(50);
    let result = ReportTable::new()
        .walk_body(&report, false, &mut |_| Ok(()))
        .unwrap();
    assert_eq!(result, BodyResult { count: 20, partial: false });
}

#[test]
fn report_limit_equal_to_row_count_marks_partial() {
    let mut report = report("EventDetail", &["truck1"]);
    report.constraints_mut().set_report_limit(3);
    let result = ReportTable::new()
        .walk_body(&report, false, &mut |_| Ok(()))
        .unwrap();
    assert_eq!(result, BodyResult { count: 3, partial: true });
}
