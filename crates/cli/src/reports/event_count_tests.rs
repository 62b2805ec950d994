// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::model::STATUS_MOTION_STOP;
use crate::test_utils::{DAY_START, body_values, report, row_values};

const KEYS: &[&str] = &["index", "deviceId", "deviceDesc", "count"];

#[test]
fn counts_per_device_with_a_total() {
    let report = report("EventCount", &["truck1", "van2"]);
    assert!(report.entry().is_none());
    assert_eq!(
        body_values(&report, KEYS),
        vec![
            vec!["1", "van2", "Alpha Van", "1"],
            vec!["2", "truck1", "Truck One", "3"],
        ]
    );
    let totals = report.totals_rows().unwrap().unwrap();
    assert_eq!(
        row_values(&report, totals, KEYS),
        vec![vec!["", "", "Total", "4"]]
    );
}

#[test]
fn total_follows_the_last_body_pass() {
    let mut report = report("EventCount", &["truck1", "van2"]);
    body_values(&report, KEYS);
    report
        .constraints_mut()
        .set_status_codes(vec![STATUS_MOTION_STOP]);
    assert_eq!(
        body_values(&report, &["count"]),
        vec![vec!["1"], vec!["1"]]
    );
    let totals = report.totals_rows().unwrap().unwrap();
    assert_eq!(row_values(&report, totals, &["count"]), vec![vec!["2"]]);
}

#[test]
fn time_range_limits_the_counts() {
    let mut report = report("EventCount", &["truck1"]);
    report
        .constraints_mut()
        .set_time_range(DAY_START + 7200, -1);
    assert_eq!(body_values(&report, &["count"]), vec![vec!["2"]]);
}

#[test]
fn unknown_devices_are_skipped() {
    let report = report("EventCount", &["ghost", "van2"]);
    assert_eq!(body_values(&report, &["deviceId"]), vec![vec!["van2"]]);
}
