// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Most recent event of each device.

use crate::constraints::{LimitType, ReportConstraints};
use crate::data::{ReportData, ReportKind};
use crate::devices::ReportDeviceList;
use crate::error::Result;
use crate::factory::ReportEntry;
use crate::model::RecordAction;
use crate::request::RequestContext;
use crate::template::{DataIterator, template_rows};

use super::event_layout::{self, EventRow};

#[derive(Debug, Default)]
pub struct EventSummaryReport;

impl ReportKind for EventSummaryReport {
    fn supports_map(&self) -> bool {
        true
    }

    /// Looks back over all history, one event per device.
    fn post_initialize(&self, constraints: &mut ReportConstraints) {
        constraints.set_time_start(-1);
        constraints.set_selection_limit_with_type(LimitType::Last, 1);
    }

    fn body_rows<'a>(&'a self, report: &'a ReportData) -> Result<DataIterator<'a>> {
        let mut rows = Vec::new();
        for holder in report.devices().holders(true) {
            let device = match holder.device() {
                Ok(Some(device)) => device,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(
                        "Error retrieving EventData for Device: {} ({})",
                        holder.device_id(),
                        e
                    );
                    continue;
                }
            };
            let last = report
                .device_event_data(&device, &mut |_| RecordAction::Save)
                .pop();
            if let Some(event) = last {
                rows.push(EventRow::new(event, &device.description));
            }
        }
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
        Box::new(EventSummaryReport),
    ))
}

#[cfg(test)]
#[path = "event_summary_tests.rs"]
mod tests;
