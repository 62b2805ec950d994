// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use super::*;
use crate::factory::ReportEntry;
use crate::model::DeviceGroup;
use crate::reports::{event_layout, field_layout};
use crate::test_utils::{DAY_START, registry, report, request};
use yare::parameterized;

fn expand(text: &str, ids: &[&str]) -> String {
    report("EventDetail", ids).expand_header_text(text)
}

#[test]
fn default_style_sheet_ends_with_newline() {
    let style = DefaultStyle::new(vec!["a.css".into()], ".x { }");
    assert_eq!(style.style_sheet(), ".x { }\n");
    assert_eq!(style.css_files(), ["a.css".to_string()]);
    assert_eq!(DefaultStyle::new(Vec::new(), "  \n ").style_sheet(), "");
}

#[test]
fn reports_share_their_kind_layout() {
    let registry = registry();
    let detail = registry.report_factory("EventDetail", false).unwrap().unwrap();
    let summary = registry.report_factory("EventSummary", false).unwrap().unwrap();
    let count = registry.report_factory("EventCount", false).unwrap().unwrap();
    assert!(Arc::ptr_eq(detail.layout(), summary.layout()));
    assert_eq!(detail.layout().class_name(), event_layout::CLASS_NAME);
    assert_eq!(count.layout().class_name(), field_layout::CLASS_NAME);
}

#[test]
fn layout_formats_default_to_date_and_time() {
    let registry = registry();
    let layout = registry.report_factory("EventDetail", false).unwrap().unwrap();
    let layout = layout.layout();
    assert_eq!(layout.date_format(), "yyyy/MM/dd");
    assert_eq!(layout.time_format(), "HH:mm:ss");
    assert_eq!(layout.date_time_format(), "yyyy/MM/dd HH:mm:ss");
    assert_eq!(layout.css_files(true), vec!["css/Reports.css".to_string()]);
    assert!(layout.css_files(false).is_empty());
}

#[test]
fn report_style_is_written_for_html_only() {
    let registry = registry();
    let factory = registry.report_factory("EventCount", false).unwrap().unwrap();

    let mut html = Vec::new();
    factory.layout().write_report_style("HTML", &mut html).unwrap();
    let html = String::from_utf8(html).unwrap();
    assert!(html.starts_with('\n'));
    assert!(html.contains(".rptTbl { border: 1px solid; }"), "{}", html);

    let mut csv = Vec::new();
    factory.layout().write_report_style("csv", &mut csv).unwrap();
    assert!(csv.is_empty());
}

#[test]
fn layout_display_lists_catalog_columns() {
    let registry = registry();
    let factory = registry.report_factory("EventCount", false).unwrap().unwrap();
    let text = factory.layout().to_string();
    assert!(text.starts_with("Layout: fleetreport.reports.FieldLayout\n"));
    assert!(text.contains("  Column: count => Count\n"));
    assert!(text.contains("  Column: eventcount => Count\n"));
}

#[parameterized(
    device_id = { "deviceId", Some(HeaderKey::DeviceId) },
    upper = { "DEVICEDESC", Some(HeaderKey::DeviceDesc) },
    padded = { " dateRange ", Some(HeaderKey::DateRange) },
    limit = { "limit", Some(HeaderKey::Limit) },
    unknown = { "odometer", None },
)]
fn header_key_parse(key: &str, expected: Option<HeaderKey>) {
    assert_eq!(HeaderKey::parse(key), expected);
}

#[test]
fn single_device_header() {
    assert_eq!(
        expand("${deviceDesc} [${deviceId}]", &["truck1"]),
        "Truck One [truck1]"
    );
}

#[test]
fn multiple_device_header() {
    assert_eq!(
        expand("${deviceDesc}|${deviceId}", &["truck1", "van2"]),
        "(Multiple Devices)|(Multiple Devices)"
    );
}

#[test]
fn no_device_header_is_blank() {
    assert_eq!(expand("[${deviceId}]", &[]), "[]");
}

#[test]
fn group_header_without_group_is_all() {
    assert_eq!(expand("${groupId}/${groupDesc}", &["truck1"]), "all/All");
}

#[test]
fn group_header_uses_group_description() {
    let request = request();
    let factory = registry().report_factory("EventSummary", false).unwrap().unwrap();
    let entry = ReportEntry::new(Arc::clone(&factory), "");
    let group = DeviceGroup {
        account_id: "acme".into(),
        group_id: "west".into(),
        description: "West Coast".into(),
        device_ids: vec!["truck1".into(), "van2".into()],
    };
    let report = factory
        .create_report_for_group(Some(&entry), None, &request, Some(group))
        .unwrap();
    assert_eq!(report.expand_header_text("${groupId}: ${groupDesc}"), "west: West Coast");
    assert_eq!(report.report_subtitle(), "West Coast");
}

#[test]
fn whole_day_range_prints_dates() {
    let mut report = report("EventDetail", &["truck1"]);
    report
        .constraints_mut()
        .set_time_range(DAY_START, DAY_START + 86_399);
    assert_eq!(
        report.expand_header_text("${dateRange}"),
        "'2024/01/01' through '2024/01/01' [UTC]"
    );
}

#[test]
fn open_ended_ranges() {
    let mut report = report("EventDetail", &["truck1"]);
    report.constraints_mut().set_time_start(DAY_START + 3600);
    assert_eq!(
        report.expand_header_text("${dateRange}"),
        "'2024/01/01 01:00:00' through Present [UTC]"
    );

    report.constraints_mut().set_time_range(-1, DAY_START + 7200);
    assert_eq!(
        report.expand_header_text("${dateRange}"),
        "As of '2024/01/01 02:00:00' [UTC]"
    );

    report.constraints_mut().set_time_range(-1, -1);
    assert_eq!(report.expand_header_text("${dateRange}"), "[UTC]");
}

#[test]
fn limit_header() {
    let mut report = report("EventDetail", &["truck1"]);
    assert_eq!(report.expand_header_text("${limit}"), "");
    report.constraints_mut().set_report_limit(5);
    assert_eq!(report.expand_header_text("${limit}"), "(First 5 records)");
    report.constraints_mut().set_report_limit(1);
    assert_eq!(report.expand_header_text("${limit}"), "(First record)");
}

#[test]
fn option_values_win_over_other_keys() {
    let request = request();
    let factory = registry().report_factory("EventDetail", false).unwrap().unwrap();
    let entry = ReportEntry::new(Arc::clone(&factory), "");
    let report = factory
        .create_report_for_ids(Some(&entry), Some("stops"), &request, &["truck1"])
        .unwrap();
    assert_eq!(
        report.expand_header_text("${description} (${code})"),
        "Stops only (61715)"
    );
}

#[parameterized(
    request_key = { "${accountDesc}", "Acme Freight" },
    timezone = { "${timezone}", "UTC" },
    default_used = { "${fuel=n/a}", "n/a" },
    unknown_uppercased = { "${fuel}", "FUEL" },
    newline = { "Line\\nTwo", "Line\nTwo" },
    trimmed = { "  padded  ", "padded" },
    no_keys = { "Plain title", "Plain title" },
)]
fn header_text_expansion(text: &str, expected: &str) {
    assert_eq!(expand(text, &["truck1"]), expected);
}
