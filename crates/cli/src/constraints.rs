// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Query and selection constraints for one report instance.
//!
//! A report definition carries default constraints; every report instance
//! receives its own clone, so mutating one never leaks into another.

use std::fmt;

use serde::Serialize;

/// Which end of a time range a selection limit keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LimitType {
    /// Oldest records first.
    #[default]
    First,
    /// Newest records.
    Last,
}

impl LimitType {
    /// Parse `first`/`last`, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Some(LimitType::First),
            "last" => Some(LimitType::Last),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LimitType::First => "FIRST",
            LimitType::Last => "LAST",
        }
    }
}

impl fmt::Display for LimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a clause joins the accumulated WHERE selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhereOp {
    Set,
    Or,
    And,
}

/// Selection parameters for a report instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConstraints {
    time_start: i64,
    time_end: i64,
    valid_gps: bool,
    sel_limit_type: LimitType,
    sel_limit: i64,
    rpt_limit: i64,
    ascending: bool,
    where_clause: String,
    rule_selector: Option<String>,
    status_codes: Option<Vec<i32>>,
    email_addresses: Option<String>,
}

impl Default for ReportConstraints {
    fn default() -> Self {
        Self {
            time_start: -1,
            time_end: -1,
            valid_gps: false,
            sel_limit_type: LimitType::First,
            sel_limit: -1,
            rpt_limit: -1,
            ascending: true,
            where_clause: String::new(),
            rule_selector: None,
            status_codes: None,
            email_addresses: None,
        }
    }
}

/// Limits of 0 become 1; negative limits mean unlimited.
fn normalize_limit(limit: i64) -> i64 {
    match limit {
        l if l < 0 => -1,
        0 => 1,
        l => l,
    }
}

impl ReportConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraints over a time range with a selection limit; the report limit
    /// defaults to the selection limit.
    pub fn with_range(
        time_start: i64,
        time_end: i64,
        valid_gps: bool,
        limit_type: LimitType,
        limit: i64,
    ) -> Self {
        let mut rc = Self::default();
        rc.set_time_range(time_start, time_end);
        rc.set_valid_gps_required(valid_gps);
        rc.set_selection_limit_with_type(limit_type, limit);
        rc.set_report_limit(limit);
        rc
    }

    /// Non-positive start times mean "open".
    pub fn set_time_start(&mut self, ts: i64) {
        self.time_start = if ts > 0 { ts } else { -1 };
    }

    pub fn time_start(&self) -> i64 {
        self.time_start
    }

    /// Non-positive end times mean "open".
    pub fn set_time_end(&mut self, te: i64) {
        self.time_end = if te > 0 { te } else { -1 };
    }

    pub fn time_end(&self) -> i64 {
        self.time_end
    }

    pub fn set_time_range(&mut self, start: i64, end: i64) {
        self.time_start = start;
        self.time_end = end;
    }

    pub fn valid_gps_required(&self) -> bool {
        self.valid_gps
    }

    pub fn set_valid_gps_required(&mut self, required: bool) {
        self.valid_gps = required;
    }

    pub fn order_ascending(&self) -> bool {
        self.ascending
    }

    pub fn set_order_ascending(&mut self, ascending: bool) {
        self.ascending = ascending;
    }

    pub fn selection_limit_type(&self) -> LimitType {
        self.sel_limit_type
    }

    pub fn selection_limit(&self) -> i64 {
        self.sel_limit
    }

    pub fn has_selection_limit(&self) -> bool {
        self.sel_limit > 0
    }

    pub fn set_selection_limit(&mut self, limit: i64) {
        self.sel_limit = normalize_limit(limit);
    }

    pub fn set_selection_limit_with_type(&mut self, limit_type: LimitType, limit: i64) {
        self.sel_limit_type = limit_type;
        self.set_selection_limit(limit);
    }

    pub fn report_limit(&self) -> i64 {
        self.rpt_limit
    }

    pub fn has_report_limit(&self) -> bool {
        self.rpt_limit > 0
    }

    pub fn set_report_limit(&mut self, limit: i64) {
        self.rpt_limit = normalize_limit(limit);
    }

    pub fn where_clause(&self) -> &str {
        &self.where_clause
    }

    pub fn has_where(&self) -> bool {
        !self.where_clause.is_empty()
    }

    /// Replace the selection clause.
    pub fn set_where(&mut self, clause: &str) {
        self.append_where(clause, WhereOp::Set);
    }

    /// Extend the selection with `OR`.
    pub fn or_where(&mut self, clause: &str) {
        self.append_where(clause, WhereOp::Or);
    }

    /// Extend the selection with `AND`.
    pub fn and_where(&mut self, clause: &str) {
        self.append_where(clause, WhereOp::And);
    }

    fn append_where(&mut self, clause: &str, op: WhereOp) {
        let sel = clause.trim();
        if op == WhereOp::Set {
            self.where_clause.clear();
            if !sel.is_empty() {
                self.where_clause = format!("({})", sel);
            }
            return;
        }
        if sel.is_empty() {
            return;
        }
        if self.where_clause.is_empty() {
            self.where_clause = format!("({})", sel);
        } else {
            let joiner = if op == WhereOp::Or { "OR" } else { "AND" };
            self.where_clause = format!("({} {} ({}))", self.where_clause, joiner, sel);
        }
    }

    pub fn rule_selector(&self) -> &str {
        self.rule_selector.as_deref().unwrap_or("")
    }

    pub fn has_rule_selector(&self) -> bool {
        self.rule_selector.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn set_rule_selector(&mut self, selector: Option<String>) {
        self.rule_selector = selector;
    }

    pub fn status_codes(&self) -> Option<&[i32]> {
        self.status_codes.as_deref()
    }

    pub fn has_status_codes(&self) -> bool {
        self.status_codes.is_some()
    }

    /// An empty list clears the filter.
    pub fn set_status_codes(&mut self, codes: Vec<i32>) {
        self.status_codes = if codes.is_empty() { None } else { Some(codes) };
    }

    pub fn email_addresses(&self) -> Option<&str> {
        self.email_addresses.as_deref()
    }

    pub fn has_email_addresses(&self) -> bool {
        self.email_addresses.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn set_email_addresses(&mut self, addresses: &str) {
        self.email_addresses = Some(addresses.trim().to_string());
    }
}

impl fmt::Display for ReportConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReportConstraints: TimeStart={} TimeEnd={} ValidGPSRequired={} \
             SelectionLimitType={} SelectionLimit={} ReportLimit={} Where='{}'",
            self.time_start,
            self.time_end,
            self.valid_gps,
            self.sel_limit_type,
            self.sel_limit,
            self.rpt_limit,
            self.where_clause
        )
    }
}

#[cfg(test)]
#[path = "constraints_tests.rs"]
mod tests;
