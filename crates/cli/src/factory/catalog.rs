// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report kinds and layouts known to this build, looked up by class name.
//!
//! Definitions name classes as dotted paths; a registration matches either
//! the full path or its last segment, so `org.example.EventDetailReport`
//! resolves to the built-in `EventDetailReport`.

use std::sync::Arc;

use super::{OptionsProvider, ReportEntry, ReportFactory};
use crate::data::ReportData;
use crate::devices::ReportDeviceList;
use crate::error::Result;
use crate::model::{Account, User};
use crate::reports::{event_count, event_detail, event_layout, event_summary, field_layout};
use crate::request::RequestContext;
use crate::template::ColumnCatalog;

pub type EntryBuilder = fn(&ReportEntry, &RequestContext, ReportDeviceList) -> Result<ReportData>;

pub type LegacyBuilder = fn(
    Arc<ReportFactory>,
    &RequestContext,
    Account,
    Option<User>,
    ReportDeviceList,
) -> Result<ReportData>;

/// How a kind constructs its report.
#[derive(Clone, Copy)]
pub enum ReportBuilder {
    /// Takes the entry the report was requested through.
    Entry(EntryBuilder),
    /// Takes the factory plus explicit account and user.
    Legacy(LegacyBuilder),
}

pub struct KindRegistration {
    pub class_name: &'static str,
    pub layout_class: &'static str,
    pub builder: ReportBuilder,
    pub options: Option<OptionsProvider>,
}

pub struct LayoutRegistration {
    pub class_name: &'static str,
    pub catalog: fn() -> &'static dyn ColumnCatalog,
}

static KINDS: [KindRegistration; 3] = [
    KindRegistration {
        class_name: "fleetreport.reports.EventDetailReport",
        layout_class: event_layout::CLASS_NAME,
        builder: ReportBuilder::Entry(event_detail::build),
        options: None,
    },
    KindRegistration {
        class_name: "fleetreport.reports.EventSummaryReport",
        layout_class: event_layout::CLASS_NAME,
        builder: ReportBuilder::Entry(event_summary::build),
        options: None,
    },
    KindRegistration {
        class_name: "fleetreport.reports.EventCountReport",
        layout_class: field_layout::CLASS_NAME,
        builder: ReportBuilder::Legacy(event_count::build),
        options: None,
    },
];

static LAYOUTS: [LayoutRegistration; 2] = [
    LayoutRegistration {
        class_name: event_layout::CLASS_NAME,
        catalog: event_layout::catalog,
    },
    LayoutRegistration {
        class_name: field_layout::CLASS_NAME,
        catalog: field_layout::catalog,
    },
];

fn short_name(class_name: &str) -> &str {
    class_name.rsplit('.').next().unwrap_or(class_name)
}

/// True when `requested` names the class registered as `registered`.
pub fn class_matches(registered: &str, requested: &str) -> bool {
    let requested = requested.trim();
    !requested.is_empty()
        && (registered == requested || short_name(registered) == short_name(requested))
}

pub fn kinds() -> &'static [KindRegistration] {
    &KINDS
}

pub fn layouts() -> &'static [LayoutRegistration] {
    &LAYOUTS
}

pub fn find_kind(class_name: &str) -> Option<&'static KindRegistration> {
    KINDS
        .iter()
        .find(|k| class_matches(k.class_name, class_name))
}

pub fn find_layout(class_name: &str) -> Option<&'static LayoutRegistration> {
    LAYOUTS
        .iter()
        .find(|l| class_matches(l.class_name, class_name))
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
