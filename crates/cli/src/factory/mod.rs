// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report definitions and the factories built from them.
//!
//! A [`ReportFactory`] is the parsed, immutable form of one `<Report>`
//! element. Each request asks the factory for a fresh
//! [`ReportData`](crate::data::ReportData) with its own copy of the default
//! constraints.

pub mod catalog;
mod parse;
mod registry;
pub mod xml;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use catalog::{KindRegistration, LayoutRegistration, ReportBuilder};
pub use parse::{LoadOptions, ParseLog, load_definition, parse_definition};
pub use registry::{RegistryHandle, ReportRegistry, ReportType, global_registry};

use crate::column::ReportColumn;
use crate::constraints::ReportConstraints;
use crate::data::ReportData;
use crate::devices::ReportDeviceList;
use crate::error::{Error, Result};
use crate::keys::{self, KEY_START, KEY_START_ALT, KeyRef};
use crate::layout::ReportLayout;
use crate::model::{Device, DeviceGroup, KILOMETERS_PER_MILE};
use crate::request::RequestContext;

pub const DEFAULT_TITLE: &str = "A Report";
pub const DEFAULT_SUBTITLE: &str = "${deviceDesc} [${deviceId}]\\n${dateRange}";
pub const DEFAULT_MENU_DESCRIPTION: &str = "Menu Item";

/// A named variant of a report, selectable per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOption {
    name: String,
    description: String,
    properties: BTreeMap<String, String>,
}

impl ReportOption {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.set_value(key, value);
        self
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn set_value(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_string(), value.to_string());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Description with `${kph:N}` / `${mph:N}` shown in the account's speed
    /// units and other keys filled from the request.
    pub fn description_for(&self, request: &RequestContext) -> String {
        let lookup = |key: &KeyRef<'_>| -> Option<String> {
            let units = request.speed_units();
            let speed = |kph: f64| format!("{} {}", units.from_kph(kph).round() as i64, units);
            match key.key.to_ascii_lowercase().as_str() {
                "kph" => key.arg_or_empty().trim().parse::<f64>().ok().map(speed),
                "mph" => key
                    .arg_or_empty()
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .map(|mph| speed(mph * KILOMETERS_PER_MILE)),
                _ => request.key_value(key.key),
            }
        };
        let desc = keys::replace_keys(&self.description, KEY_START, &lookup);
        keys::replace_keys(&desc, KEY_START_ALT, &lookup)
    }
}

/// Options computed by a report kind at request time.
pub type OptionsProvider = fn(&ReportFactory, &RequestContext) -> Vec<ReportOption>;

/// Parsed definition of one named report.
pub struct ReportFactory {
    name: String,
    report_type: String,
    type_is_group: bool,
    class_name: String,
    kind: &'static KindRegistration,
    layout: Arc<ReportLayout>,
    menu_description: Option<String>,
    title: Option<String>,
    subtitle: Option<String>,
    columns: Vec<ReportColumn>,
    constraints: Option<ReportConstraints>,
    icon_selector: Option<String>,
    properties: BTreeMap<String, String>,
    options: Vec<ReportOption>,
    sys_admin_only: bool,
    sortable: bool,
}

impl ReportFactory {
    pub fn new(
        name: &str,
        report_type: &str,
        kind: &'static KindRegistration,
        layout: Arc<ReportLayout>,
    ) -> Self {
        Self {
            name: name.to_string(),
            report_type: report_type.to_string(),
            type_is_group: false,
            class_name: kind.class_name.to_string(),
            kind,
            layout,
            menu_description: None,
            title: None,
            subtitle: None,
            columns: Vec::new(),
            constraints: None,
            icon_selector: None,
            properties: BTreeMap::new(),
            options: Vec::new(),
            sys_admin_only: false,
            sortable: false,
        }
    }

    /// Class name as written in the definition.
    pub fn with_class_name(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    pub fn with_type_is_group(mut self, is_group: bool) -> Self {
        self.type_is_group = is_group;
        self
    }

    pub fn with_menu_description(mut self, text: Option<String>) -> Self {
        self.menu_description = text;
        self
    }

    pub fn with_title(mut self, text: Option<String>) -> Self {
        self.title = text;
        self
    }

    pub fn with_subtitle(mut self, text: Option<String>) -> Self {
        self.subtitle = text;
        self
    }

    pub fn with_columns(mut self, columns: Vec<ReportColumn>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_constraints(mut self, constraints: Option<ReportConstraints>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_icon_selector(mut self, selector: Option<String>) -> Self {
        self.icon_selector = selector.filter(|s| !s.is_empty());
        self
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_options(mut self, options: Vec<ReportOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_sys_admin_only(mut self, sys_admin_only: bool) -> Self {
        self.sys_admin_only = sys_admin_only;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn report_type(&self) -> &str {
        &self.report_type
    }

    pub fn type_is_group(&self) -> bool {
        self.type_is_group
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn kind(&self) -> &'static KindRegistration {
        self.kind
    }

    pub fn layout(&self) -> &Arc<ReportLayout> {
        &self.layout
    }

    pub fn menu_description(&self) -> &str {
        self.menu_description
            .as_deref()
            .unwrap_or(DEFAULT_MENU_DESCRIPTION)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn subtitle(&self) -> &str {
        self.subtitle.as_deref().unwrap_or(DEFAULT_SUBTITLE)
    }

    pub fn columns(&self) -> &[ReportColumn] {
        &self.columns
    }

    pub fn has_constraints(&self) -> bool {
        self.constraints.is_some()
    }

    /// A private copy of the default constraints.
    pub fn constraints(&self) -> ReportConstraints {
        self.constraints.clone().unwrap_or_default()
    }

    pub fn icon_selector(&self) -> Option<&str> {
        self.icon_selector.as_deref()
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn is_sys_admin_only(&self) -> bool {
        self.sys_admin_only
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Options from the definition, else from the kind's provider.
    pub fn options(&self, request: &RequestContext) -> Vec<ReportOption> {
        if !self.options.is_empty() {
            return self.options.clone();
        }
        match self.kind.options {
            Some(provider) => provider(self, request),
            None => Vec::new(),
        }
    }

    pub fn has_options(&self, request: &RequestContext) -> bool {
        !self.options(request).is_empty()
    }

    pub fn option(&self, name: Option<&str>, request: &RequestContext) -> Option<ReportOption> {
        let name = name?;
        self.options(request).into_iter().find(|o| o.name == name)
    }

    /// `(name, description)` pairs in definition order.
    pub fn option_descriptions(&self, request: &RequestContext) -> Vec<(String, String)> {
        self.options(request)
            .iter()
            .map(|o| (o.name.clone(), o.description_for(request)))
            .collect()
    }

    /// Instantiate the report for one request.
    ///
    /// The kind's builder is chosen when the kind is registered. Entry
    /// builders need `entry`; legacy builders take the account and user from
    /// the request.
    pub fn create_report(
        self: &Arc<Self>,
        entry: Option<&ReportEntry>,
        option: Option<&str>,
        request: &RequestContext,
        devices: ReportDeviceList,
    ) -> Result<ReportData> {
        if entry.is_some_and(|e| !Arc::ptr_eq(e.factory(), self)) {
            return Err(Error::Validation(format!(
                "Invalid ReportEntry: {}",
                self.name
            )));
        }

        let mut report = match (&self.kind.builder, entry) {
            (ReportBuilder::Entry(build), Some(entry)) => build(entry, request, devices)?,
            (ReportBuilder::Entry(_), None) => {
                tracing::warn!("ReportEntry not specified: {}", self.name);
                return Err(Error::Validation(format!(
                    "Unable to create report: {}",
                    self.class_name
                )));
            }
            (ReportBuilder::Legacy(build), _) => {
                let account = request.account().clone();
                let user = request.user().cloned();
                let report = build(Arc::clone(self), request, account, user, devices)?;
                tracing::info!("Report not yet converted to new constructor: {}", self.name);
                report
            }
        };

        report.set_report_name(&self.name);
        report.set_report_title(self.title());
        report.set_report_subtitle(self.subtitle());
        report.set_columns(self.columns.clone());
        report.set_constraints(self.constraints());
        report.post_initialize();
        report.set_map_icon_selector(self.icon_selector.clone());
        report.set_option(self.option(option, request));
        Ok(report)
    }

    /// Report over one device, or no devices when `device` is `None`.
    pub fn create_report_for_device(
        self: &Arc<Self>,
        entry: Option<&ReportEntry>,
        option: Option<&str>,
        request: &RequestContext,
        device: Option<Device>,
    ) -> Result<ReportData> {
        let devices = match device {
            Some(device) => ReportDeviceList::for_device(
                Arc::clone(request.store()),
                request.account().clone(),
                request.user().cloned(),
                device,
            ),
            None => self.empty_devices(request),
        };
        self.create_report(entry, option, request, devices)
    }

    /// Report over a device group, or no devices when `group` is `None`.
    pub fn create_report_for_group(
        self: &Arc<Self>,
        entry: Option<&ReportEntry>,
        option: Option<&str>,
        request: &RequestContext,
        group: Option<DeviceGroup>,
    ) -> Result<ReportData> {
        let devices = match group {
            Some(group) => ReportDeviceList::for_group(
                Arc::clone(request.store()),
                request.account().clone(),
                request.user().cloned(),
                group,
            ),
            None => self.empty_devices(request),
        };
        self.create_report(entry, option, request, devices)
    }

    /// Report over explicit device ids.
    pub fn create_report_for_ids<S: AsRef<str>>(
        self: &Arc<Self>,
        entry: Option<&ReportEntry>,
        option: Option<&str>,
        request: &RequestContext,
        ids: &[S],
    ) -> Result<ReportData> {
        let devices = ReportDeviceList::for_ids(
            Arc::clone(request.store()),
            request.account().clone(),
            request.user().cloned(),
            ids,
        );
        self.create_report(entry, option, request, devices)
    }

    fn empty_devices(&self, request: &RequestContext) -> ReportDeviceList {
        ReportDeviceList::new(
            Arc::clone(request.store()),
            request.account().clone(),
            request.user().cloned(),
        )
    }
}

impl fmt::Debug for ReportFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportFactory")
            .field("name", &self.name)
            .field("report_type", &self.report_type)
            .field("class_name", &self.class_name)
            .field("columns", &self.columns.len())
            .finish()
    }
}

impl fmt::Display for ReportFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report: {} [{}]", self.name, self.report_type)?;
        writeln!(f, "  Class : {}", self.class_name)?;
        writeln!(f, "  Layout: {}", self.layout.class_name())?;
        writeln!(f, "  Title : {}", self.title())?;
        for column in &self.columns {
            writeln!(f, "  Column: {}", column)?;
        }
        Ok(())
    }
}

/// A factory paired with the access-control name it is offered under.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    factory: Arc<ReportFactory>,
    acl_name: String,
}

impl ReportEntry {
    /// A blank ACL name becomes `acl.report.<name>`.
    pub fn new(factory: Arc<ReportFactory>, acl_name: &str) -> Self {
        let acl_name = if acl_name.trim().is_empty() {
            format!("acl.report.{}", factory.name())
        } else {
            acl_name.trim().to_string()
        };
        Self { factory, acl_name }
    }

    pub fn factory(&self) -> &Arc<ReportFactory> {
        &self.factory
    }

    pub fn acl_name(&self) -> &str {
        &self.acl_name
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
