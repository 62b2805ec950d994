// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report layouts: style sheets, date formats and header text.
//!
//! One [`ReportLayout`] exists per layout class in a registry. It owns the
//! column catalog its reports bind against and hands rendering off to
//! [`presentation`](crate::presentation).

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::constraints::LimitType;
use crate::data::ReportData;
use crate::error::{Error, Result};
use crate::factory::LayoutRegistration;
use crate::keys::{self, KEY_START, KeyRef};
use crate::model::{DEVICE_GROUP_ALL, DEVICE_GROUP_ALL_DESC};
use crate::presentation::{self, ReportFormat};
use crate::template::ColumnCatalog;
use crate::timefmt::{DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT};

pub const CSS_CLASS_TABLE: &str = "rptTbl";
pub const CSS_CLASS_TABLE_SORT: &str = "rptTbl_sortable";
pub const CSS_CLASS_ODD: &str = "rptBodyRowOdd";
pub const CSS_CLASS_EVEN: &str = "rptBodyRowEven";
pub const CSS_CLASS_BODY_TOTAL: &str = "rptBodyRowTotal";
pub const CSS_CLASS_TOTAL: &str = "rptTotalRow";
pub const CSS_CLASS_TOTAL_2: &str = "rptTotalRow2";

pub const MULTIPLE_DEVICES: &str = "(Multiple Devices)";

/// CSS files and style sheet shared by every layout of a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultStyle {
    css_files: Vec<String>,
    style_sheet: String,
}

impl DefaultStyle {
    /// A non-blank style sheet always ends with a newline.
    pub fn new(css_files: Vec<String>, style_sheet: &str) -> Self {
        Self {
            css_files,
            style_sheet: terminated(style_sheet),
        }
    }

    pub fn css_files(&self) -> &[String] {
        &self.css_files
    }

    pub fn style_sheet(&self) -> &str {
        &self.style_sheet
    }
}

fn terminated(style: &str) -> String {
    if style.trim().is_empty() {
        String::new()
    } else if style.ends_with('\n') {
        style.to_string()
    } else {
        format!("{}\n", style)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub struct ReportLayout {
    class_name: &'static str,
    catalog: &'static dyn ColumnCatalog,
    date_format: Option<String>,
    time_format: Option<String>,
    css_files: Vec<String>,
    style_sheet: String,
    default_style: Arc<DefaultStyle>,
}

impl ReportLayout {
    pub fn new(registration: &'static LayoutRegistration, default_style: Arc<DefaultStyle>) -> Self {
        Self {
            class_name: registration.class_name,
            catalog: (registration.catalog)(),
            date_format: None,
            time_format: None,
            css_files: Vec::new(),
            style_sheet: String::new(),
            default_style,
        }
    }

    pub fn with_date_format(mut self, format: Option<&str>) -> Self {
        self.date_format = non_blank(format);
        self
    }

    pub fn with_time_format(mut self, format: Option<&str>) -> Self {
        self.time_format = non_blank(format);
        self
    }

    pub fn with_style(mut self, css_files: Vec<String>, style_sheet: &str) -> Self {
        self.css_files = css_files;
        self.style_sheet = style_sheet.to_string();
        self
    }

    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    pub fn catalog(&self) -> &'static dyn ColumnCatalog {
        self.catalog
    }

    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT)
    }

    pub fn time_format(&self) -> &str {
        self.time_format.as_deref().unwrap_or(DEFAULT_TIME_FORMAT)
    }

    pub fn date_time_format(&self) -> String {
        format!("{} {}", self.date_format(), self.time_format())
    }

    pub fn default_style(&self) -> &DefaultStyle {
        &self.default_style
    }

    /// CSS files to link, optionally preceded by the definition defaults.
    pub fn css_files(&self, include_default: bool) -> Vec<String> {
        let mut files = Vec::new();
        if include_default {
            files.extend(self.default_style.css_files.iter().cloned());
        }
        files.extend(self.css_files.iter().cloned());
        files
    }

    pub fn has_style_sheet(&self) -> bool {
        !self.style_sheet.trim().is_empty()
    }

    pub fn style_sheet(&self, include_default: bool) -> String {
        if include_default {
            format!("{}{}", self.default_style.style_sheet, self.style_sheet)
        } else {
            self.style_sheet.clone()
        }
    }

    /// Write the inline style block used ahead of HTML reports.
    ///
    /// Other formats carry no style and write nothing.
    pub fn write_report_style(&self, format: &str, out: &mut dyn Write) -> Result<()> {
        if !matches!(ReportFormat::parse(format), ReportFormat::Html) {
            return Ok(());
        }
        let mut style = String::from("\n");
        for part in [self.default_style.style_sheet.as_str(), &self.style_sheet] {
            if !part.trim().is_empty() {
                style.push_str(part);
                style.push('\n');
            }
        }
        out.write_all(style.as_bytes()).map_err(Error::render)
    }

    /// Render `report` in `format`, returning the number of body records.
    pub fn write_report(
        &self,
        format: &str,
        report: &mut ReportData,
        out: &mut dyn Write,
    ) -> Result<usize> {
        presentation::write_report(format, report, out)
    }
}

impl fmt::Debug for ReportLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportLayout")
            .field("class_name", &self.class_name)
            .field("date_format", &self.date_format())
            .field("time_format", &self.time_format())
            .finish()
    }
}

impl fmt::Display for ReportLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layout: {}", self.class_name)?;
        for (name, title) in self.catalog.column_titles() {
            writeln!(f, "  Column: {} => {}", name, title)?;
        }
        Ok(())
    }
}

/// Header keys computed from the report itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKey {
    DeviceId,
    DeviceDesc,
    GroupId,
    GroupDesc,
    Timezone,
    DateRange,
    Limit,
}

impl HeaderKey {
    /// Case-insensitive.
    pub fn parse(key: &str) -> Option<Self> {
        let key = match key.trim().to_ascii_lowercase().as_str() {
            "deviceid" => HeaderKey::DeviceId,
            "devicedesc" => HeaderKey::DeviceDesc,
            "groupid" => HeaderKey::GroupId,
            "groupdesc" => HeaderKey::GroupDesc,
            "timezone" => HeaderKey::Timezone,
            "daterange" => HeaderKey::DateRange,
            "limit" => HeaderKey::Limit,
            _ => return None,
        };
        Some(key)
    }

    pub fn value(&self, _arg: Option<&str>, report: &ReportData) -> String {
        let devices = report.devices();
        match self {
            HeaderKey::DeviceId => match devices.len() {
                0 => String::new(),
                1 => devices.first_device_id().to_string(),
                _ => MULTIPLE_DEVICES.to_string(),
            },
            HeaderKey::DeviceDesc => match devices.len() {
                0 => String::new(),
                1 => devices
                    .first_device()
                    .map(|d| d.description)
                    .unwrap_or_default(),
                _ => MULTIPLE_DEVICES.to_string(),
            },
            HeaderKey::GroupId => match devices.group() {
                Some(group) => group.group_id.clone(),
                None => DEVICE_GROUP_ALL.to_string(),
            },
            HeaderKey::GroupDesc => match devices.group() {
                Some(group) if !group.description.is_empty() => group.description.clone(),
                Some(group) => group.group_id.clone(),
                None => DEVICE_GROUP_ALL_DESC.to_string(),
            },
            HeaderKey::Timezone => report.zone().name().to_string(),
            HeaderKey::DateRange => date_range(report),
            HeaderKey::Limit => limit_text(report),
        }
    }
}

fn date_range(report: &ReportData) -> String {
    let layout = report.layout();
    let zone = report.zone();
    let constraints = report.constraints();
    let (start, end) = (constraints.time_start(), constraints.time_end());

    // Whole-day bounds print as dates.
    let start_fmt = if start > 0 && start == zone.day_start(start) {
        layout.date_format().to_string()
    } else {
        layout.date_time_format()
    };
    let end_fmt = if end > 0 && end == zone.day_end(end) {
        layout.date_format().to_string()
    } else {
        layout.date_time_format()
    };

    let mut text = if start > 0 && end > 0 {
        format!(
            "'{}' through '{}'",
            zone.format(start, &start_fmt),
            zone.format(end, &end_fmt)
        )
    } else if start > 0 {
        format!("'{}' through Present", zone.format(start, &start_fmt))
    } else if end > 0 {
        format!("As of '{}'", zone.format(end, &end_fmt))
    } else {
        String::new()
    };
    text.push_str(&format!(" [{}]", zone.name()));
    text
}

fn limit_text(report: &ReportData) -> String {
    let constraints = report.constraints();
    let limit = constraints.report_limit();
    if limit <= 0 {
        return String::new();
    }
    match (constraints.selection_limit_type(), limit) {
        (LimitType::First, 1) => "(First record)".to_string(),
        (LimitType::First, n) => format!("(First {} records)", n),
        (LimitType::Last, 1) => " (Last record)".to_string(),
        (LimitType::Last, n) => format!(" (Last {} records)", n),
    }
}

fn header_value(key: &KeyRef<'_>, report: &ReportData) -> String {
    if let Some(option) = report.option() {
        let from_option = if key.key.eq_ignore_ascii_case("description") {
            Some(option.description_for(report.request()))
        } else {
            option.value(key.key).map(str::to_string)
        };
        if let Some(value) = from_option {
            return value;
        }
    }
    if let Some(header) = HeaderKey::parse(key.key) {
        return header.value(key.arg, report);
    }
    if let Some(value) = report.request().key_value(key.key) {
        return value;
    }
    match key.default {
        Some(default) => default.to_string(),
        None => {
            tracing::warn!("Header text replacement key not found: {}", key.key);
            key.key.to_uppercase()
        }
    }
}

/// Replace `${key[:arg][=default]}` references in title or header text.
///
/// Report option values win, then report-derived keys, then request keys.
/// Literal `\n` sequences become newlines and the result is trimmed.
pub fn expand_header_text(text: &str, report: &ReportData) -> String {
    let expanded = if text.contains(KEY_START) {
        keys::scan_keys(text, KEY_START, |key, _| header_value(key, report))
    } else {
        text.to_string()
    };
    expanded.replace("\\n", "\n").trim().to_string()
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
