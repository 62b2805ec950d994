// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Number of matching events per device, with a grand total.

use std::cell::Cell;
use std::sync::Arc;

use crate::data::{ReportData, ReportKind};
use crate::devices::ReportDeviceList;
use crate::error::Result;
use crate::factory::ReportFactory;
use crate::model::{Account, User};
use crate::request::RequestContext;
use crate::template::{DataIterator, RowType, template_rows};

use super::field_layout::{self, FIELD_COUNT, FIELD_DEVICE_DESC, FIELD_DEVICE_ID, FieldRow};

/// Label of the totals row.
const TOTAL_LABEL: &str = "Total";

#[derive(Debug, Default)]
pub struct EventCountReport {
    /// Sum of the counts from the last body pass.
    total: Cell<u64>,
}

impl ReportKind for EventCountReport {
    fn body_rows<'a>(&'a self, report: &'a ReportData) -> Result<DataIterator<'a>> {
        let mut total = 0;
        let mut rows = Vec::new();
        for holder in report.devices().holders(true) {
            let device = match holder.device() {
                Ok(device) => device,
                Err(e) => {
                    tracing::error!("Error retrieving Device: {} ({})", holder.device_id(), e);
                    None
                }
            };
            let Some(device) = device else {
                continue;
            };
            let count = report.count_event_data(Some(&device));
            total += count;
            rows.push(
                FieldRow::new(RowType::Detail)
                    .with(FIELD_DEVICE_ID, device.device_id.as_str())
                    .with(FIELD_DEVICE_DESC, device.description.as_str())
                    .with(FIELD_COUNT, count as i64),
            );
        }
        self.total.set(total);
        Ok(template_rows(field_layout::template(), rows))
    }

    fn totals_rows<'a>(&'a self, _report: &'a ReportData) -> Result<Option<DataIterator<'a>>> {
        let row = FieldRow::new(RowType::Total)
            .with(FIELD_DEVICE_DESC, TOTAL_LABEL)
            .with(FIELD_COUNT, self.total.get() as i64);
        Ok(Some(template_rows(field_layout::template(), vec![row])))
    }
}

pub fn build(
    factory: Arc<ReportFactory>,
    request: &RequestContext,
    account: Account,
    user: Option<User>,
    devices: ReportDeviceList,
) -> Result<ReportData> {
    Ok(ReportData::new_legacy(
        factory,
        request,
        account,
        user,
        devices,
        Box::new(EventCountReport::default()),
    ))
}

#[cfg(test)]
#[path = "event_count_tests.rs"]
mod tests;
