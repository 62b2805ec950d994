// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Every selected event, per device.

use crate::data::{ReportData, ReportKind};
use crate::devices::ReportDeviceList;
use crate::error::Result;
use crate::factory::ReportEntry;
use crate::request::RequestContext;
use crate::template::{DataIterator, template_rows};

use super::event_layout::{self, EventRow};

#[derive(Debug, Default)]
pub struct EventDetailReport;

impl ReportKind for EventDetailReport {
    fn single_device_only(&self) -> bool {
        true
    }

    fn supports_map(&self) -> bool {
        true
    }

    fn supports_kml(&self) -> bool {
        true
    }

    fn body_rows<'a>(&'a self, report: &'a ReportData) -> Result<DataIterator<'a>> {
        let devices = report.devices();
        let rows: Vec<EventRow> = report
            .event_data()
            .into_iter()
            .map(|ev| {
                let desc = devices
                    .holder(&ev.device_id)
                    .map(|h| h.description())
                    .unwrap_or_default();
                EventRow::new(ev, &desc)
            })
            .collect();
        Ok(template_rows(event_layout::template(), rows))
    }
}

pub fn build(
    entry: &ReportEntry,
    request: &RequestContext,
    devices: ReportDeviceList,
) -> Result<ReportData> {
    Ok(ReportData::new_entry(
        entry,
        request,
        devices,
        Box::new(EventDetailReport),
    ))
}

#[cfg(test)]
#[path = "event_detail_tests.rs"]
mod tests;
