// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared unit test utilities.
//!
//! A small fleet, a report definition over it, and helpers to build and
//! render reports.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::column::ReportColumn;
use crate::data::ReportData;
use crate::error::Result;
use crate::factory::{LoadOptions, ReportEntry, ReportRegistry, parse_definition};
use crate::mail::{MailMessage, MailSender};
use crate::model::{
    Account, Device, DeviceGroup, EventRecord, FleetStore, STATUS_LOCATION, STATUS_MOTION_START,
    STATUS_MOTION_STOP, User,
};
use crate::request::RequestContext;
use crate::spreadsheet::{CellStyle, SpreadsheetBackend};
use crate::store::MemoryStore;
use crate::template::DataIterator;

pub const ACCOUNT: &str = "acme";

/// 2024-01-01T00:00:00Z
pub const DAY_START: i64 = 1_704_067_200;

/// Two devices in one account: `truck1` with three events, `van2` with one.
pub fn fleet_store() -> Arc<dyn FleetStore> {
    Arc::new(memory_store())
}

pub fn memory_store() -> MemoryStore {
    let mut first = EventRecord::new(ACCOUNT, "truck1", DAY_START + 3600, STATUS_LOCATION)
        .at(37.5, -122.25)
        .with_speed(0.0);
    first.address = "100 Main St".into();
    let mut stop = EventRecord::new(ACCOUNT, "van2", DAY_START + 5400, STATUS_MOTION_STOP)
        .at(34.05, -118.25);
    stop.address = "5 Harbor Way".into();
    MemoryStore::default()
        .with_account(account())
        .with_user(User::new(ACCOUNT, "admin"))
        .with_user(User::new(ACCOUNT, "driver").with_authorized(["truck1"]))
        .with_device(Device::new(ACCOUNT, "truck1", "Truck One"))
        .with_device(Device::new(ACCOUNT, "van2", "Alpha Van"))
        .with_group(DeviceGroup {
            account_id: ACCOUNT.into(),
            group_id: "west".into(),
            description: "West Coast".into(),
            device_ids: vec!["truck1".into(), "van2".into()],
        })
        .with_events([
            first,
            EventRecord::new(ACCOUNT, "truck1", DAY_START + 7200, STATUS_MOTION_START)
                .at(37.75, -122.5)
                .with_speed(80.0),
            EventRecord::new(ACCOUNT, "truck1", DAY_START + 10800, STATUS_MOTION_STOP)
                .at(38.0, -122.75),
            stop,
        ])
}

pub fn account() -> Account {
    let mut account = Account::new(ACCOUNT);
    account.description = "Acme Freight".into();
    account.report_email = "ops@acme.test".into();
    account
}

pub fn request() -> RequestContext {
    RequestContext::new(fleet_store(), account())
}

/// Definition with one report of each built-in kind.
pub const REPORTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ReportDefinition>
  <Property key="fleetName">Acme</Property>
  <DefaultStyle cssFile="css/Reports.css">.rptTbl { border: 1px solid; }</DefaultStyle>
  <ReportTypes>
    <ReportType name="device.detail">Device Detail</ReportType>
    <ReportType name="fleet.summary" isGroup="true">Fleet Summary</ReportType>
  </ReportTypes>
  <Report name="EventDetail" type="device.detail" class="fleetreport.reports.EventDetailReport">
    <MenuDescription>Event Detail</MenuDescription>
    <Title>Event Detail</Title>
    <SimpleColumns>index dateTime status speed address</SimpleColumns>
    <Options>
      <Option name="stops">
        <Description>Stops only</Description>
        <Property key="code">61715</Property>
      </Option>
    </Options>
    <Constraints>
      <Where>statusCode != 0</Where>
    </Constraints>
  </Report>
  <Report name="EventSummary" type="fleet.summary" class="EventSummaryReport">
    <Title>Last Known Location</Title>
    <Subtitle>${groupDesc}</Subtitle>
    <SimpleColumns>deviceId deviceDesc dateTime status</SimpleColumns>
  </Report>
  <Report name="EventCount" type="fleet.summary" class="fleetreport.reports.EventCountReport">
    <Title>Event Count</Title>
    <Subtitle>${fleetName=Fleet}</Subtitle>
    <SimpleColumns>index deviceId deviceDesc count</SimpleColumns>
  </Report>
</ReportDefinition>
"#;

pub fn registry() -> ReportRegistry {
    let registry = parse_definition(REPORTS_XML, None, &LoadOptions::default());
    assert!(
        !registry.has_parsing_errors(),
        "{:?}",
        registry.log().errors()
    );
    registry
}

/// Report `name` over `ids`, requested through its default entry.
pub fn report_with(request: &RequestContext, name: &str, ids: &[&str]) -> ReportData {
    let factory = registry().report_factory(name, false).unwrap().unwrap();
    let entry = ReportEntry::new(Arc::clone(&factory), "");
    factory
        .create_report_for_ids(Some(&entry), None, request, ids)
        .unwrap()
}

pub fn report(name: &str, ids: &[&str]) -> ReportData {
    report_with(&request(), name, ids)
}

/// Report `name` from a definition other than [`REPORTS_XML`].
pub fn report_from(xml: &str, name: &str, ids: &[&str]) -> ReportData {
    let registry = parse_definition(xml, None, &LoadOptions::default());
    let factory = registry.report_factory(name, false).unwrap().unwrap();
    let entry = ReportEntry::new(Arc::clone(&factory), "");
    factory
        .create_report_for_ids(Some(&entry), None, &request(), ids)
        .unwrap()
}

/// Render `report` in `format` and return the output as text.
pub fn render(report: &mut ReportData, format: &str) -> (String, usize) {
    let mut out = Vec::new();
    let count = report.write_report(format, &mut out).unwrap();
    (String::from_utf8(out).unwrap(), count)
}

/// `keys` read from each row of `rows`, as text.
pub fn row_values(report: &ReportData, rows: DataIterator<'_>, keys: &[&str]) -> Vec<Vec<String>> {
    rows.enumerate()
        .map(|(i, row)| {
            keys.iter()
                .map(|key| {
                    let column = ReportColumn::from_token(key);
                    row.db_value(key, i, report, &column).to_string()
                })
                .collect()
        })
        .collect()
}

/// Body rows of `report`, as text.
pub fn body_values(report: &ReportData, keys: &[&str]) -> Vec<Vec<String>> {
    row_values(report, report.body_rows().unwrap(), keys)
}

/// Mail sender that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().clone()
    }
}

impl MailSender for RecordingMailer {
    fn send(&self, message: &MailMessage) -> Result<()> {
        if self.fail {
            return Err(crate::error::Error::Internal("mail transport down".into()));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}

/// A cell written through [`RecordingSheet`].
#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    pub row: u32,
    pub col: u16,
    pub value: String,
    pub style: CellStyle,
}

/// Spreadsheet backend that records cells; clones share the recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingSheet {
    cells: Arc<Mutex<Vec<SheetCell>>>,
    widths: Arc<Mutex<Vec<(u16, f64)>>>,
}

impl RecordingSheet {
    pub fn cells(&self) -> Vec<SheetCell> {
        self.cells.lock().clone()
    }

    pub fn widths(&self) -> Vec<(u16, f64)> {
        self.widths.lock().clone()
    }

    /// Values of `row`, left to right.
    pub fn row(&self, row: u32) -> Vec<String> {
        self.cells
            .lock()
            .iter()
            .filter(|c| c.row == row)
            .map(|c| c.value.clone())
            .collect()
    }

    fn record(&self, row: u32, col: u16, value: String, style: CellStyle) {
        self.cells.lock().push(SheetCell {
            row,
            col,
            value,
            style,
        });
    }
}

impl SpreadsheetBackend for RecordingSheet {
    fn set_column_width(&mut self, col: u16, width: f64) -> Result<()> {
        self.widths.lock().push((col, width));
        Ok(())
    }

    fn write_text(&mut self, row: u32, col: u16, text: &str, style: CellStyle) -> Result<()> {
        self.record(row, col, text.to_string(), style);
        Ok(())
    }

    fn write_number(&mut self, row: u32, col: u16, value: f64, style: CellStyle) -> Result<()> {
        self.record(row, col, value.to_string(), style);
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        Ok(b"workbook".to_vec())
    }
}

/// Creates a directory tree from a list of (path, content) pairs.
///
/// Parent directories are created automatically.
pub fn create_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}
