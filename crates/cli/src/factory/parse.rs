// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report definition grammar.
//!
//! Parsing is best-effort: a bad report, option or column is logged on the
//! [`ParseLog`] and skipped while the rest of the document continues.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::ReportOption;
use super::registry::{self, ReportRegistry, ReportType};
use super::xml::{XmlNode, parse_bool};
use crate::column::ReportColumn;
use crate::config::{Config, PROPERTY_PREFIX};
use crate::constraints::{LimitType, ReportConstraints};
use crate::discovery;
use crate::error::{Error, Result};
use crate::filter::{self, RuleEngine};
use crate::keys;

/// Separators between `<SimpleColumns>` tokens.
const SIMPLE_COLUMN_SEPARATORS: [char; 5] = [',', ' ', '\t', '\r', '\n'];

/// Settings that shape how a definition is loaded.
#[derive(Clone)]
pub struct LoadOptions {
    /// Skip reports whose class is not registered instead of flagging an error.
    pub ignore_missing: bool,
    /// Report optional-but-missing classes as warnings and parse errors.
    pub debug: bool,
    pub include_dir: Option<PathBuf>,
    /// Runtime property values, winning over `<Property>` in the document.
    pub property_overrides: BTreeMap<String, String>,
    /// Engine used to check `<RuleSelector>` and `<MapIconSelector>` syntax.
    pub rule_engine: Option<Arc<dyn RuleEngine>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            ignore_missing: true,
            debug: false,
            include_dir: None,
            property_overrides: BTreeMap::new(),
            rule_engine: None,
        }
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("ignore_missing", &self.ignore_missing)
            .field("debug", &self.debug)
            .field("include_dir", &self.include_dir)
            .field("property_overrides", &self.property_overrides)
            .field("rule_engine", &self.rule_engine.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

impl LoadOptions {
    /// Options from the `[reports]` and `[properties]` tables.
    ///
    /// Relative include directories resolve against `base`, the directory
    /// holding the config file.
    pub fn from_config(config: &Config, base: Option<&Path>) -> Self {
        let mut property_overrides = BTreeMap::new();
        for (key, value) in &config.properties {
            if !key.starts_with(PROPERTY_PREFIX) {
                property_overrides.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in &config.properties {
            if let Some(bare) = key.strip_prefix(PROPERTY_PREFIX) {
                property_overrides.insert(bare.to_string(), value.clone());
            }
        }
        let reports = &config.reports;
        Self {
            ignore_missing: reports.ignore_missing,
            debug: reports.debug,
            include_dir: reports
                .include_dir
                .as_deref()
                .map(|dir| config.resolve_path(base, dir)),
            property_overrides,
            rule_engine: filter::rule_engine_for(&reports.rule_engine),
        }
    }
}

/// Errors and warnings collected while loading a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseLog {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ParseLog {
    pub(super) fn error(&mut self, message: String) {
        tracing::error!("{}", message);
        self.errors.push(message);
    }

    pub(super) fn warning(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn has_parsing_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_parsing_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A `<ReportLayout>` element before its class is resolved.
#[derive(Debug, Clone, Default)]
pub(super) struct PendingLayout {
    pub class_name: String,
    pub optional: bool,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
    pub css_files: Vec<String>,
    pub style_sheet: String,
}

/// A `<Report>` element before its class and type are resolved.
#[derive(Debug, Clone, Default)]
pub(super) struct PendingReport {
    pub name: String,
    pub report_type: String,
    pub class_name: String,
    pub optional: bool,
    pub sys_admin_only: bool,
    pub sortable: bool,
    pub menu_description: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub columns: Option<Vec<ReportColumn>>,
    pub options: Vec<ReportOption>,
    pub constraints: Option<ReportConstraints>,
    pub icon_selector: Option<String>,
    pub properties: BTreeMap<String, String>,
}

/// Everything read from a definition and its includes.
#[derive(Debug, Default)]
pub(super) struct PendingDefinition {
    pub log: ParseLog,
    pub properties: BTreeMap<String, String>,
    pub css_files: Vec<String>,
    pub style_sheet: String,
    pub layouts: Vec<PendingLayout>,
    pub types: BTreeMap<String, ReportType>,
    pub reports: Vec<PendingReport>,
}

impl PendingDefinition {
    /// Document properties with runtime overrides applied.
    pub fn effective_properties(&self, options: &LoadOptions) -> BTreeMap<String, String> {
        let mut props = self.properties.clone();
        for (key, value) in &options.property_overrides {
            props.insert(key.clone(), value.clone());
        }
        props
    }
}

/// Load a definition file and build a registry from it.
///
/// A missing or unreadable file yields an empty registry with the failure on
/// its parse log.
pub fn load_definition(path: &Path, options: &LoadOptions) -> ReportRegistry {
    let mut parser = DefinitionParser::new(options);
    parser.load_file(path);
    registry::build(parser.finish(), options)
}

/// Build a registry from definition text.
///
/// `source` names the file the text came from; includes resolve against its
/// directory.
pub fn parse_definition(xml: &str, source: Option<&Path>, options: &LoadOptions) -> ReportRegistry {
    let mut parser = DefinitionParser::new(options);
    parser.parse_document(xml, source);
    registry::build(parser.finish(), options)
}

struct DefinitionParser<'o> {
    options: &'o LoadOptions,
    def: PendingDefinition,
    visited: Vec<PathBuf>,
}

impl<'o> DefinitionParser<'o> {
    fn new(options: &'o LoadOptions) -> Self {
        Self {
            options,
            def: PendingDefinition::default(),
            visited: Vec::new(),
        }
    }

    fn finish(self) -> PendingDefinition {
        self.def
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.options
            .property_overrides
            .get(key)
            .or_else(|| self.def.properties.get(key))
            .map(String::as_str)
    }

    fn property_bool(&self, key: &str, default: bool) -> bool {
        self.property(key).map_or(default, |v| parse_bool(v, default))
    }

    /// `ifTrue`/`ifFalse` gate on an element.
    fn is_enabled(&self, node: &XmlNode) -> bool {
        if let Some(key) = node.attr_non_blank("ifTrue") {
            if !self.property_bool(key.trim(), false) {
                return false;
            }
        }
        if let Some(key) = node.attr_non_blank("ifFalse") {
            if self.property_bool(key.trim(), true) {
                return false;
            }
        }
        true
    }

    fn fill_keys(&self, text: &str) -> String {
        keys::insert_key_values(text, &self.def.effective_properties(self.options))
    }

    fn load_file(&mut self, path: &Path) {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.visited.contains(&canonical) {
            self.def.log.warning(format!(
                "Definition already loaded, skipping include: {}",
                path.display()
            ));
            return;
        }
        self.visited.push(canonical);

        match std::fs::read_to_string(path) {
            Ok(xml) => self.parse_document(&xml, Some(path)),
            Err(e) => self.def.log.error(format!(
                "Unable to read report definition {}: {}",
                path.display(),
                e
            )),
        }
    }

    fn parse_document(&mut self, xml: &str, source: Option<&Path>) {
        let label = source.map_or_else(|| "<inline>".to_string(), |p| p.display().to_string());
        let root = match XmlNode::parse(xml) {
            Ok(root) => root,
            Err(e) => {
                self.def.log.error(format!("[{}] Parse error: {}", label, e));
                return;
            }
        };
        if !root.is("ReportDefinition") {
            self.def
                .log
                .error(format!("[{}] Invalid root tag ID: {}", label, root.name));
            return;
        }
        tracing::debug!("parsing report definition {}", label);

        for node in root.elements() {
            if node.is("Properties") {
                self.parse_properties(node);
            } else if node.is("Property") {
                self.parse_property(node);
            } else if node.is("DefaultStyle") {
                self.parse_default_style(node);
            } else if node.is("ReportLayout") {
                let layout = self.parse_layout(node);
                self.def.layouts.push(layout);
            } else if node.is("ReportTypes") {
                self.parse_types(node);
            } else if node.is("Report") {
                if let Some(report) = self.parse_report(node) {
                    self.def.reports.push(report);
                }
            } else if node.is("Include") {
                self.parse_include(node, source);
            } else {
                self.def
                    .log
                    .error(format!("[{}] Unrecognized tag name: {}", label, node.name));
            }
        }
    }

    fn parse_properties(&mut self, node: &XmlNode) {
        for prop in node.children_named("Property") {
            self.parse_property(prop);
        }
    }

    fn parse_property(&mut self, node: &XmlNode) {
        let key = node.attr("key").unwrap_or("").trim();
        if key.is_empty() {
            self.def
                .log
                .error(format!("Report Property '{}' is blank", key));
            return;
        }
        self.def
            .properties
            .insert(key.to_string(), node.text(Some("\\n")));
    }

    fn parse_default_style(&mut self, node: &XmlNode) {
        if let Some(file) = node.attr_non_blank("cssFile") {
            self.def.css_files.push(file.trim().to_string());
        }
        let style = reformat_style(&node.text(None));
        if !style.is_empty() {
            self.def.style_sheet.push_str(&style);
            self.def.style_sheet.push('\n');
        }
    }

    fn parse_layout(&mut self, node: &XmlNode) -> PendingLayout {
        let mut layout = PendingLayout {
            class_name: node.attr("class").unwrap_or("").trim().to_string(),
            optional: node.attr_bool("optional", false),
            ..PendingLayout::default()
        };
        for child in node.elements() {
            if child.is("DateFormat") {
                if layout.date_format.is_none() {
                    layout.date_format = Some(child.text(Some("")));
                }
            } else if child.is("TimeFormat") {
                if layout.time_format.is_none() {
                    layout.time_format = Some(child.text(Some("")));
                }
            } else if child.is("LayoutStyle") {
                if let Some(file) = child.attr_non_blank("cssFile") {
                    layout.css_files.push(file.trim().to_string());
                }
                let style = reformat_style(&child.text(None));
                if !style.is_empty() {
                    layout.style_sheet.push_str(&style);
                    layout.style_sheet.push('\n');
                }
            } else {
                self.def.log.warning(format!(
                    "Unrecognized ReportLayout tag name: {}",
                    child.name
                ));
            }
        }
        layout
    }

    fn parse_types(&mut self, node: &XmlNode) {
        for child in node.children_named("ReportType") {
            let name = child.attr("name").unwrap_or("").trim();
            if name.is_empty() {
                self.def.log.warning("ReportType name is blank".to_string());
                continue;
            }
            let report_type = ReportType {
                name: name.to_string(),
                is_group: child.attr_bool("isGroup", false),
                description: child.text(Some(" ")),
            };
            self.def.types.insert(name.to_string(), report_type);
        }
    }

    fn parse_include(&mut self, node: &XmlNode, source: Option<&Path>) {
        let file = node.attr("file").unwrap_or("").trim();
        if file.is_empty() {
            self.def.log.error("Include file is blank".to_string());
            return;
        }
        let optional = node.attr_bool("optional", false);
        let include_dir = node
            .attr_non_blank("dir")
            .map(|d| PathBuf::from(d.trim()))
            .or_else(|| self.options.include_dir.clone());
        let parent = source.and_then(Path::parent);
        match discovery::find_include(parent, include_dir.as_deref(), Path::new(file)) {
            Some(path) => {
                tracing::debug!("including report definition {}", path.display());
                self.load_file(&path);
            }
            None if optional => {
                tracing::debug!("optional include not found: {}", file);
            }
            None => self
                .def
                .log
                .error(format!("Include file not found: {}", file)),
        }
    }

    fn parse_report(&mut self, node: &XmlNode) -> Option<PendingReport> {
        let name = node.attr("name").unwrap_or("").trim().to_string();
        if name.is_empty() {
            self.def.log.error("Report name is blank".to_string());
            return None;
        }
        let mut report = PendingReport {
            report_type: node.attr("type").unwrap_or("").trim().to_string(),
            class_name: node.attr("class").unwrap_or("").trim().to_string(),
            optional: node.attr_bool("optional", false),
            sys_admin_only: node.attr_bool("sysAdminOnly", false),
            sortable: node.attr_bool("sortable", false),
            name,
            ..PendingReport::default()
        };
        let mut have_constraints = false;
        let mut options_seen = false;

        for child in node.elements() {
            if child.is("MenuDescription") {
                report.menu_description = Some(child.text(Some("\\n")));
            } else if child.is("Title") {
                report.title = Some(child.text(Some("\\n")));
            } else if child.is("Subtitle") {
                report.subtitle = Some(child.text(Some("\\n")));
            } else if child.is("SimpleColumns") {
                if report.columns.is_none() {
                    report.columns = Some(simple_columns(child, report.sortable));
                }
            } else if child.is("Columns") {
                if report.columns.is_none() {
                    report.columns = Some(self.parse_columns(child, report.sortable));
                }
            } else if child.is("Options") {
                if !options_seen {
                    options_seen = true;
                    report.options = self.parse_options(child, &report.name);
                }
            } else if child.is("Constraints") {
                if have_constraints {
                    continue;
                }
                have_constraints = true;
                match self.parse_constraints(child) {
                    Ok(constraints) => report.constraints = Some(constraints),
                    Err(e) => {
                        self.def
                            .log
                            .error(format!("Report '{}' [{}]", report.name, e));
                        return None;
                    }
                }
            } else if child.is("MapIconSelector") {
                report.icon_selector = self.parse_icon_selector(child, &report.name);
            } else if child.is("Property") {
                let key = child.attr("key").unwrap_or("").trim();
                if key.is_empty() {
                    self.def.log.error(format!(
                        "Report '{}' Property key is blank",
                        report.name
                    ));
                    continue;
                }
                let value = self.fill_keys(&child.text(Some("\\n")));
                report.properties.insert(key.to_string(), value);
            } else {
                self.def.log.error(format!(
                    "Report '{}' Unrecognized tag name: {}",
                    report.name, child.name
                ));
            }
        }
        Some(report)
    }

    fn parse_columns(&mut self, node: &XmlNode, report_sortable: bool) -> Vec<ReportColumn> {
        let mut columns = Vec::new();
        for child in node.children_named("Column") {
            if !self.is_enabled(child) {
                continue;
            }
            let name = child
                .attr_non_blank("name")
                .or_else(|| child.attr_non_blank("key"))
                .unwrap_or("")
                .trim();
            if name.is_empty() {
                self.def.log.error("Column name is blank".to_string());
                continue;
            }
            let arg = child.attr("arg").unwrap_or("").trim();
            let title = child.text(Some("\\n"));
            let title = (!title.is_empty()).then_some(title.as_str());
            let sortable = report_sortable && child.attr_bool("sortable", true);
            let mut column = ReportColumn::new(name, arg, title).with_sortable(sortable);
            if let Some(fill) = child.attr("blankFill") {
                column = column.with_blank_fill(fill);
            }
            columns.push(column);
        }
        columns
    }

    fn parse_options(&mut self, node: &XmlNode, report: &str) -> Vec<ReportOption> {
        let mut options: Vec<ReportOption> = Vec::new();
        for child in node.elements() {
            if !child.is("Option") {
                self.def.log.error(format!(
                    "Report '{}' Unrecognized TAG: {}",
                    report, child.name
                ));
                continue;
            }
            if !self.is_enabled(child) {
                continue;
            }
            let name = child.attr("name").unwrap_or("").trim();
            if name.is_empty() {
                self.def
                    .log
                    .error(format!("Report '{}' Missing Option name", report));
                continue;
            }
            if options.iter().any(|o| o.name() == name) {
                self.def.log.error(format!(
                    "Report '{}' Option already defined: {}",
                    report, name
                ));
                continue;
            }
            let mut option = ReportOption::new(name);
            for part in child.elements() {
                if part.is("Description") {
                    option.set_description(&part.text(Some(" ")));
                } else if part.is("Property") {
                    let key = part.attr("key").unwrap_or("").trim();
                    if key.is_empty() {
                        self.def.log.error(format!(
                            "Report '{}' Option Property '{}' is blank",
                            report, key
                        ));
                        continue;
                    }
                    option.set_value(key, &self.fill_keys(&part.text(Some("\\n"))));
                } else {
                    self.def.log.error(format!(
                        "Report '{}' Option '{}' Unrecognized TAG: {}",
                        report, name, part.name
                    ));
                }
            }
            options.push(option);
        }
        options
    }

    /// Selector text when `ruleFactoryName` names the installed engine.
    fn selector_for_engine(&self, node: &XmlNode) -> Option<(Arc<dyn RuleEngine>, String)> {
        let engine = self.options.rule_engine.as_ref()?;
        let wanted = node.attr("ruleFactoryName").unwrap_or("").trim();
        if !wanted.is_empty() && !wanted.eq_ignore_ascii_case(engine.name()) {
            tracing::debug!("skipping selector for rule engine {}", wanted);
            return None;
        }
        Some((Arc::clone(engine), node.text(Some(" "))))
    }

    fn parse_icon_selector(&mut self, node: &XmlNode, report: &str) -> Option<String> {
        let (engine, selector) = self.selector_for_engine(node)?;
        if let Err(e) = engine.validate(&selector) {
            self.def.log.error(format!(
                "Report '{}' Invalid MapIconSelector syntax: {}",
                report, e
            ));
            return None;
        }
        Some(selector).filter(|s| !s.is_empty())
    }

    fn parse_constraints(&mut self, node: &XmlNode) -> Result<ReportConstraints> {
        let mut rc = ReportConstraints::new();
        let mut saw_ascending = false;
        let mut saw_descending = false;

        for child in node.elements() {
            if child.is("TimeStart") {
                rc.set_time_start(parse_long(&child.text(None), -1));
            } else if child.is("TimeEnd") {
                rc.set_time_end(parse_long(&child.text(None), -1));
            } else if child.is("ValidGPSRequired") {
                rc.set_valid_gps_required(parse_bool(&child.text(None), false));
            } else if child.is("OrderAscending") {
                saw_ascending = true;
                rc.set_order_ascending(parse_bool(&child.text(None), true));
            } else if child.is("OrderDescending") {
                saw_descending = true;
                let descending = parse_bool(&child.text(None), false);
                rc.set_order_ascending(!descending);
            } else if child.is("SelectionLimit") {
                let limit = parse_long(&child.text(None), -1);
                let limit_type = child
                    .attr("type")
                    .and_then(LimitType::parse)
                    .unwrap_or(if limit > 0 { LimitType::Last } else { LimitType::First });
                rc.set_selection_limit_with_type(limit_type, limit);
            } else if child.is("ReportLimit") {
                rc.set_report_limit(parse_long(&child.text(None), -1));
            } else if child.is("Where") {
                rc.set_where(&child.text(Some(" ")));
            } else if child.is("RuleSelector") {
                if let Some((engine, selector)) = self.selector_for_engine(child) {
                    engine.validate(&selector).map_err(|e| {
                        Error::Validation(format!("Invalid RuleSelector syntax: {}", e))
                    })?;
                    rc.set_rule_selector(Some(selector));
                }
            } else {
                return Err(Error::Validation(format!(
                    "Unrecognized Constraints tag name: {}",
                    child.name
                )));
            }
        }

        if saw_ascending && saw_descending {
            return Err(Error::Validation(
                "OrderAscending and OrderDescending are both specified".to_string(),
            ));
        }
        Ok(rc)
    }
}

fn simple_columns(node: &XmlNode, sortable: bool) -> Vec<ReportColumn> {
    node.text(None)
        .split(SIMPLE_COLUMN_SEPARATORS)
        .filter(|token| !token.trim().is_empty())
        .map(|token| ReportColumn::from_token(token.trim()).with_sortable(sortable))
        .collect()
}

/// Trim every line and drop blank ones.
fn reformat_style(style: &str) -> String {
    style
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_long(text: &str, default: i64) -> i64 {
    text.trim().parse().unwrap_or(default)
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
