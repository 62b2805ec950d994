// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-request report state.
//!
//! A [`ReportData`] binds one factory's columns and constraints to the
//! devices a request asked for. Report kinds plug in through [`ReportKind`],
//! which supplies the body and totals rows.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use crate::callback::ReportCallback;
use crate::column::ReportColumn;
use crate::constraints::{LimitType, ReportConstraints};
use crate::devices::ReportDeviceList;
use crate::error::Result;
use crate::factory::{ReportEntry, ReportFactory, ReportOption};
use crate::keys::{self, KEY_START};
use crate::layout::{self, ReportLayout};
use crate::model::{Account, Device, EventQuery, EventRecord, RecordAction, User};
use crate::request::RequestContext;
use crate::template::DataIterator;
use crate::timefmt::Zone;

pub const DEFAULT_REPORT_NAME: &str = "generic.report";

/// Behavior that differs between report kinds.
pub trait ReportKind {
    /// Render one section per device in HTML output.
    fn single_device_only(&self) -> bool {
        false
    }

    fn supports_graph(&self) -> bool {
        false
    }

    fn supports_map(&self) -> bool {
        false
    }

    fn supports_kml(&self) -> bool {
        false
    }

    fn graph_link_description(&self) -> Option<String> {
        None
    }

    fn map_link_description(&self) -> Option<String> {
        None
    }

    fn kml_link_description(&self) -> Option<String> {
        None
    }

    /// Last chance to adjust constraints before rows are read.
    fn post_initialize(&self, _constraints: &mut ReportConstraints) {}

    fn body_rows<'a>(&'a self, report: &'a ReportData) -> Result<DataIterator<'a>>;

    fn totals_rows<'a>(&'a self, _report: &'a ReportData) -> Result<Option<DataIterator<'a>>> {
        Ok(None)
    }
}

pub struct ReportData {
    factory: Arc<ReportFactory>,
    entry: Option<ReportEntry>,
    request: RequestContext,
    account: Account,
    user: Option<User>,
    devices: ReportDeviceList,
    kind: Box<dyn ReportKind>,
    name: String,
    title: String,
    subtitle: String,
    columns: Vec<ReportColumn>,
    constraints: ReportConstraints,
    icon_selector: Option<String>,
    option: Option<ReportOption>,
    preferred_format: String,
    graph_url: Option<String>,
    map_url: Option<String>,
    kml_url: Option<String>,
    refresh_url: Option<String>,
    auto_report_url: Option<String>,
    callback: Option<ReportCallback>,
    max_event_count: Cell<usize>,
}

impl ReportData {
    /// A report requested through `entry`; account and user come from the request.
    pub fn new_entry(
        entry: &ReportEntry,
        request: &RequestContext,
        devices: ReportDeviceList,
        kind: Box<dyn ReportKind>,
    ) -> Self {
        let mut report = Self::new_legacy(
            Arc::clone(entry.factory()),
            request,
            request.account().clone(),
            request.user().cloned(),
            devices,
            kind,
        );
        report.entry = Some(entry.clone());
        report
    }

    /// A report with an explicit account and user.
    pub fn new_legacy(
        factory: Arc<ReportFactory>,
        request: &RequestContext,
        account: Account,
        user: Option<User>,
        devices: ReportDeviceList,
        kind: Box<dyn ReportKind>,
    ) -> Self {
        Self {
            factory,
            entry: None,
            request: request.clone(),
            account,
            user,
            devices,
            kind,
            name: String::new(),
            title: String::new(),
            subtitle: String::new(),
            columns: Vec::new(),
            constraints: ReportConstraints::default(),
            icon_selector: None,
            option: None,
            preferred_format: String::new(),
            graph_url: None,
            map_url: None,
            kml_url: None,
            refresh_url: None,
            auto_report_url: None,
            callback: None,
            max_event_count: Cell::new(0),
        }
    }

    pub fn entry(&self) -> Option<&ReportEntry> {
        self.entry.as_ref()
    }

    pub fn factory(&self) -> &Arc<ReportFactory> {
        &self.factory
    }

    pub fn layout(&self) -> &Arc<ReportLayout> {
        self.factory.layout()
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn is_soap_request(&self) -> bool {
        self.request.is_soap()
    }

    pub fn zone(&self) -> &Zone {
        self.request.zone()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_id(&self) -> &str {
        &self.account.account_id
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.user_id.as_str())
    }

    /// Factory properties with the selected option's properties laid over them.
    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut props = self.factory.properties().clone();
        if let Some(option) = &self.option {
            props.extend(
                option
                    .properties()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        props
    }

    pub fn property(&self, key: &str) -> Option<String> {
        if let Some(v) = self.option.as_ref().and_then(|o| o.value(key)) {
            return Some(v.to_string());
        }
        self.factory.properties().get(key).cloned()
    }

    pub fn property_bool(&self, key: &str, default: bool) -> bool {
        match self.property(key) {
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => true,
                "false" | "no" | "0" | "off" => false,
                _ => default,
            },
            None => default,
        }
    }

    pub fn set_report_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn report_name(&self) -> &str {
        if self.name.is_empty() {
            DEFAULT_REPORT_NAME
        } else {
            &self.name
        }
    }

    pub fn report_type(&self) -> &str {
        self.factory.report_type()
    }

    pub fn set_report_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// Title with header keys expanded; a blank title shows the report name default.
    pub fn report_title(&self) -> String {
        if self.title.is_empty() {
            self.expand_header_text(DEFAULT_REPORT_NAME)
        } else {
            self.expand_header_text(&self.title)
        }
    }

    pub fn set_report_subtitle(&mut self, subtitle: &str) {
        self.subtitle = subtitle.to_string();
    }

    pub fn report_subtitle(&self) -> String {
        self.expand_header_text(&self.subtitle)
    }

    pub fn expand_header_text(&self, text: &str) -> String {
        layout::expand_header_text(text, self)
    }

    pub fn set_map_icon_selector(&mut self, selector: Option<String>) {
        self.icon_selector = selector;
    }

    pub fn map_icon_selector(&self) -> Option<&str> {
        self.icon_selector.as_deref()
    }

    pub fn set_preferred_format(&mut self, format: &str) {
        self.preferred_format = format.trim().to_string();
    }

    pub fn preferred_format(&self) -> &str {
        &self.preferred_format
    }

    pub fn is_single_device_only(&self) -> bool {
        self.kind.single_device_only()
    }

    pub fn devices(&self) -> &ReportDeviceList {
        &self.devices
    }

    pub(crate) fn devices_mut(&mut self) -> &mut ReportDeviceList {
        &mut self.devices
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn first_device_id(&self) -> &str {
        self.devices.first_device_id()
    }

    pub fn device(&self, device_id: &str) -> Result<Option<Device>> {
        self.devices.device(device_id)
    }

    pub fn set_columns(&mut self, columns: Vec<ReportColumn>) {
        self.columns = columns;
    }

    pub fn columns(&self) -> &[ReportColumn] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_report_column(&self, name: &str) -> bool {
        !name.trim().is_empty() && self.columns.iter().any(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn set_option(&mut self, option: Option<ReportOption>) {
        self.option = option;
    }

    pub fn option(&self) -> Option<&ReportOption> {
        self.option.as_ref()
    }

    pub fn set_constraints(&mut self, constraints: ReportConstraints) {
        self.constraints = constraints;
    }

    pub fn constraints(&self) -> &ReportConstraints {
        &self.constraints
    }

    pub fn constraints_mut(&mut self) -> &mut ReportConstraints {
        &mut self.constraints
    }

    /// Let the kind adjust the constraints it was given.
    pub fn post_initialize(&mut self) {
        self.kind.post_initialize(&mut self.constraints);
    }

    pub fn rule_selector(&self) -> &str {
        self.constraints.rule_selector()
    }

    /// WHERE clause with `${key}` references filled from the selected option.
    pub fn where_selector(&self) -> String {
        let clause = self.constraints.where_clause();
        match &self.option {
            Some(option) => keys::replace_keys(clause, KEY_START, |key| {
                option.value(key.key).map(str::to_string)
            }),
            None => clause.to_string(),
        }
    }

    pub fn selection_limit_type(&self) -> LimitType {
        self.constraints.selection_limit_type()
    }

    pub fn selection_limit(&self) -> i64 {
        self.constraints.selection_limit()
    }

    pub fn report_limit(&self) -> i64 {
        self.constraints.report_limit()
    }

    pub fn time_start(&self) -> i64 {
        self.constraints.time_start()
    }

    pub fn time_end(&self) -> i64 {
        self.constraints.time_end()
    }

    pub fn body_rows(&self) -> Result<DataIterator<'_>> {
        self.kind.body_rows(self)
    }

    pub fn totals_rows(&self) -> Result<Option<DataIterator<'_>>> {
        self.kind.totals_rows(self)
    }

    pub fn set_callback(&mut self, callback: Option<ReportCallback>) -> Result<()> {
        self.callback = match callback {
            Some(mut cb) => {
                cb.set_report(self)?;
                Some(cb)
            }
            None => None,
        };
        Ok(())
    }

    pub fn callback(&self) -> Option<&ReportCallback> {
        self.callback.as_ref()
    }

    pub(crate) fn take_callback(&mut self) -> Option<ReportCallback> {
        self.callback.take()
    }

    pub(crate) fn restore_callback(&mut self, callback: Option<ReportCallback>) {
        self.callback = callback;
    }

    fn event_query(&self, device_id: &str) -> EventQuery {
        let mut query = EventQuery::new(self.account_id(), device_id);
        query.time_start = self.time_start();
        query.time_end = self.time_end();
        query.status_codes = self.constraints.status_codes().map(<[i32]>::to_vec);
        query.valid_gps = self.constraints.valid_gps_required();
        query.limit_type = self.selection_limit_type();
        query.limit = self.selection_limit();
        query.ascending = self.constraints.order_ascending();
        query.where_clause = self.where_selector();
        query
    }

    /// Events for every device, clipped to the report limit.
    pub fn event_data(&self) -> Vec<EventRecord> {
        self.event_data_with(&mut |_| RecordAction::Save)
    }

    /// Like [`event_data`](Self::event_data), passing each matching record to `handler`.
    pub fn event_data_with(
        &self,
        handler: &mut dyn FnMut(&EventRecord) -> RecordAction,
    ) -> Vec<EventRecord> {
        let limit = self.report_limit();
        let mut events: Vec<EventRecord> = Vec::new();
        self.max_event_count.set(0);
        for device_id in self.devices.device_ids() {
            if limit >= 0 && events.len() as i64 >= limit {
                break;
            }
            let mut seen = 0;
            match self.devices.device(device_id) {
                Ok(device) => {
                    let found = self.query_device(device.as_ref(), &mut *handler, &mut seen);
                    if limit < 0 {
                        events.extend(found);
                    } else {
                        let room = (limit as usize).saturating_sub(events.len());
                        events.extend(found.into_iter().take(room));
                    }
                }
                Err(e) => {
                    tracing::error!("Error retrieving EventData for Device: {} ({})", device_id, e);
                }
            }
            if seen > self.max_event_count.get() {
                self.max_event_count.set(seen);
            }
        }
        events
    }

    /// Events for a single device.
    pub fn device_event_data(
        &self,
        device: &Device,
        handler: &mut dyn FnMut(&EventRecord) -> RecordAction,
    ) -> Vec<EventRecord> {
        let mut seen = 0;
        let events = self.query_device(Some(device), handler, &mut seen);
        self.max_event_count.set(seen);
        events
    }

    fn query_device(
        &self,
        device: Option<&Device>,
        handler: &mut dyn FnMut(&EventRecord) -> RecordAction,
        seen: &mut usize,
    ) -> Vec<EventRecord> {
        let Some(device) = device else {
            return Vec::new();
        };

        let selector = self.rule_selector().trim().to_string();
        let engine = if selector.is_empty() {
            None
        } else {
            let engine = self.request.rule_engine().cloned();
            if engine.is_none() {
                tracing::warn!("RuleSelector not supported");
            }
            engine
        };

        let mut record_handler = |ev: &EventRecord| -> RecordAction {
            *seen += 1;
            let is_match = match &engine {
                Some(engine) => engine.is_match(&selector, ev).unwrap_or_else(|e| {
                    tracing::warn!("RuleSelector evaluation failed: {}", e);
                    false
                }),
                None => true,
            };
            if is_match { handler(ev) } else { RecordAction::Skip }
        };

        let query = self.event_query(&device.device_id);
        match self
            .devices
            .store()
            .range_events(&query, &mut record_handler)
        {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Unable to obtain EventData records: {}", e);
                Vec::new()
            }
        }
    }

    /// Largest number of records the store returned for one device in the last query.
    pub fn max_event_count(&self) -> usize {
        self.max_event_count.get()
    }

    /// Number of events matching the constraints for `device`.
    ///
    /// Rule selectors are not applied to counts.
    pub fn count_event_data(&self, device: Option<&Device>) -> u64 {
        let Some(device) = device else {
            return 0;
        };
        if !self.rule_selector().trim().is_empty() {
            tracing::warn!("RuleSelector not supported when obtaining EventData record counts!");
        }
        match self
            .devices
            .store()
            .count_events(&self.event_query(&device.device_id))
        {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("Unable to obtain EventData record count: {}", e);
                0
            }
        }
    }

    pub fn supports_graph(&self) -> bool {
        self.kind.supports_graph()
    }

    /// Stored only when the kind supports graphs.
    pub fn set_graph_url(&mut self, url: Option<String>) {
        if self.supports_graph() {
            self.graph_url = url;
        }
    }

    pub fn graph_url(&self) -> Option<&str> {
        self.graph_url.as_deref().filter(|_| self.supports_graph())
    }

    pub fn graph_link_description(&self) -> Option<String> {
        self.kind.graph_link_description()
    }

    pub fn supports_map(&self) -> bool {
        self.kind.supports_map()
    }

    pub fn set_map_url(&mut self, url: Option<String>) {
        if self.supports_map() {
            self.map_url = url;
        }
    }

    pub fn map_url(&self) -> Option<&str> {
        self.map_url.as_deref().filter(|_| self.supports_map())
    }

    pub fn map_link_description(&self) -> Option<String> {
        self.kind.map_link_description()
    }

    pub fn supports_kml(&self) -> bool {
        self.kind.supports_kml()
    }

    pub fn set_kml_url(&mut self, url: Option<String>) {
        if self.supports_kml() {
            self.kml_url = url;
        }
    }

    pub fn kml_url(&self) -> Option<&str> {
        self.kml_url.as_deref().filter(|_| self.supports_kml())
    }

    pub fn kml_link_description(&self) -> Option<String> {
        self.kind.kml_link_description()
    }

    pub fn set_refresh_url(&mut self, url: Option<String>) {
        self.refresh_url = url;
    }

    pub fn refresh_url(&self) -> Option<&str> {
        self.refresh_url.as_deref()
    }

    pub fn set_auto_report_url(&mut self, url: Option<String>) {
        self.auto_report_url = url;
    }

    pub fn auto_report_url(&self) -> Option<&str> {
        self.auto_report_url.as_deref()
    }

    pub fn write_report_style(&self, format: &str, out: &mut dyn Write) -> Result<()> {
        self.layout().write_report_style(format, out)
    }

    /// Render in `format`, returning the number of body records written.
    pub fn write_report(&mut self, format: &str, out: &mut dyn Write) -> Result<usize> {
        let layout = Arc::clone(self.layout());
        layout.write_report(format, self, out)
    }
}

impl std::fmt::Debug for ReportData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportData")
            .field("name", &self.report_name())
            .field("account", &self.account.account_id)
            .field("devices", &self.devices.len())
            .field("columns", &self.columns.len())
            .field("constraints", &self.constraints)
            .finish()
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
