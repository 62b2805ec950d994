// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    full = { "fleetreport.reports.EventDetailReport", true },
    short = { "EventDetailReport", true },
    foreign_package = { "org.opengts.war.report.event.EventDetailReport", true },
    other = { "TripReport", false },
    blank = { "  ", false },
)]
fn class_name_matching(requested: &str, expected: bool) {
    assert_eq!(
        class_matches("fleetreport.reports.EventDetailReport", requested),
        expected
    );
}

#[test]
fn every_kind_has_a_registered_layout() {
    for kind in kinds() {
        assert!(
            find_layout(kind.layout_class).is_some(),
            "{} has no layout",
            kind.class_name
        );
    }
}

#[test]
fn count_report_uses_the_legacy_builder() {
    let kind = find_kind("EventCountReport").unwrap();
    assert!(matches!(kind.builder, ReportBuilder::Legacy(_)));
    let kind = find_kind("EventDetailReport").unwrap();
    assert!(matches!(kind.builder, ReportBuilder::Entry(_)));
}

#[test]
fn layout_catalogs_expose_columns() {
    let layout = find_layout("EventDataLayout").unwrap();
    let catalog = (layout.catalog)();
    assert!(catalog.has_column("speed:mph"));
    assert!(catalog.has_column("DEVICEID"));
    assert!(!catalog.has_column("fuelLevel"));
}
