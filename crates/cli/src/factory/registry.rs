// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable report registry snapshots and the process-wide handle.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use super::catalog::{self, KindRegistration, LayoutRegistration};
use super::parse::{LoadOptions, ParseLog, PendingDefinition, PendingLayout, PendingReport};
use super::{ReportFactory, load_definition};
use crate::error::{Error, Result};
use crate::layout::{DefaultStyle, ReportLayout};

/// A declared `<ReportType>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportType {
    pub name: String,
    pub is_group: bool,
    pub description: String,
}

/// Every report parsed from one definition load.
#[derive(Debug)]
pub struct ReportRegistry {
    reports: Vec<Arc<ReportFactory>>,
    index: HashMap<String, usize>,
    types: BTreeMap<String, ReportType>,
    layouts: Vec<Arc<ReportLayout>>,
    default_style: Arc<DefaultStyle>,
    properties: BTreeMap<String, String>,
    log: ParseLog,
}

impl Default for ReportRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl ReportRegistry {
    pub fn empty() -> Self {
        Self {
            reports: Vec::new(),
            index: HashMap::new(),
            types: BTreeMap::new(),
            layouts: Vec::new(),
            default_style: Arc::new(DefaultStyle::default()),
            properties: BTreeMap::new(),
            log: ParseLog::default(),
        }
    }

    /// Reports in definition order.
    pub fn reports(&self) -> &[Arc<ReportFactory>] {
        &self.reports
    }

    pub fn report_names(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn has_report(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a report by name.
    ///
    /// A missing report is `Ok(None)` when `optional`, else `NotFound`.
    pub fn report_factory(&self, name: &str, optional: bool) -> Result<Option<Arc<ReportFactory>>> {
        match self.index.get(name) {
            Some(&i) => Ok(Some(Arc::clone(&self.reports[i]))),
            None if optional => Ok(None),
            None => Err(Error::NotFound(format!("Report name not found: {}", name))),
        }
    }

    pub fn types(&self) -> &BTreeMap<String, ReportType> {
        &self.types
    }

    pub fn report_type(&self, name: &str) -> Option<&ReportType> {
        self.types.get(name)
    }

    pub fn layouts(&self) -> &[Arc<ReportLayout>] {
        &self.layouts
    }

    pub fn default_style(&self) -> &Arc<DefaultStyle> {
        &self.default_style
    }

    /// Definition properties after runtime overrides.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn log(&self) -> &ParseLog {
        &self.log
    }

    pub fn has_parsing_errors(&self) -> bool {
        self.log.has_parsing_errors()
    }

    pub fn has_parsing_warnings(&self) -> bool {
        self.log.has_parsing_warnings()
    }
}

/// Log a class that could not be resolved, honoring `optional`.
fn missing_class(log: &mut ParseLog, options: &LoadOptions, optional: bool, message: String) {
    if !options.ignore_missing && !optional {
        log.error(message);
    } else if options.debug {
        log.warning(format!("Optional {}", message));
        log.error(message);
    } else {
        tracing::debug!("Ignoring optional {}", message);
    }
}

fn build_layout(
    registration: &'static LayoutRegistration,
    pending: Option<&PendingLayout>,
    default_style: &Arc<DefaultStyle>,
) -> ReportLayout {
    let layout = ReportLayout::new(registration, Arc::clone(default_style));
    match pending {
        Some(p) => layout
            .with_date_format(p.date_format.as_deref())
            .with_time_format(p.time_format.as_deref())
            .with_style(p.css_files.clone(), &p.style_sheet),
        None => layout,
    }
}

/// Turn parsed elements into a registry, resolving classes and types.
pub(super) fn build(def: PendingDefinition, options: &LoadOptions) -> ReportRegistry {
    let properties = def.effective_properties(options);
    let PendingDefinition {
        mut log,
        css_files,
        style_sheet,
        layouts: pending_layouts,
        types,
        reports: pending_reports,
        ..
    } = def;
    let default_style = Arc::new(DefaultStyle::new(css_files, &style_sheet));

    // Customized layouts, keyed by registered class name.
    let mut layouts: Vec<(&'static str, Arc<ReportLayout>)> = Vec::new();
    for pending in &pending_layouts {
        let Some(registration) = catalog::find_layout(&pending.class_name) else {
            missing_class(
                &mut log,
                options,
                pending.optional,
                format!("ReportLayout class not found: {}", pending.class_name),
            );
            continue;
        };
        if layouts.iter().any(|(c, _)| *c == registration.class_name) {
            log.warning(format!(
                "ReportLayout already defined: {}",
                registration.class_name
            ));
            continue;
        }
        let layout = build_layout(registration, Some(pending), &default_style);
        layouts.push((registration.class_name, Arc::new(layout)));
    }

    let mut reports: Vec<Arc<ReportFactory>> = Vec::new();
    let mut index = HashMap::new();
    for pending in pending_reports {
        let name = pending.name.clone();
        if index.contains_key(&name) {
            log.error(format!("Report already defined: {}", name));
            continue;
        }
        match build_report(pending, &types, &mut layouts, &default_style) {
            Ok(factory) => {
                index.insert(name, reports.len());
                reports.push(Arc::new(factory));
            }
            Err(BuildError::MissingClass { optional, message }) => {
                let message = format!("Report '{}' [{}]", name, message);
                missing_class(&mut log, options, optional, message);
            }
            Err(BuildError::Invalid(message)) => {
                log.error(format!("Report '{}' [{}]", name, message));
            }
        }
    }

    tracing::info!(
        "loaded {} report(s), {} error(s), {} warning(s)",
        reports.len(),
        log.errors().len(),
        log.warnings().len()
    );

    ReportRegistry {
        reports,
        index,
        types,
        layouts: layouts.into_iter().map(|(_, l)| l).collect(),
        default_style,
        properties,
        log,
    }
}

enum BuildError {
    MissingClass { optional: bool, message: String },
    Invalid(String),
}

fn build_report(
    pending: PendingReport,
    types: &BTreeMap<String, ReportType>,
    layouts: &mut Vec<(&'static str, Arc<ReportLayout>)>,
    default_style: &Arc<DefaultStyle>,
) -> std::result::Result<ReportFactory, BuildError> {
    let kind: &'static KindRegistration = match catalog::find_kind(&pending.class_name) {
        Some(kind) => kind,
        None => {
            return Err(BuildError::MissingClass {
                optional: pending.optional,
                message: format!("Report class not found: {}", pending.class_name),
            });
        }
    };

    let mut first_type: Option<&ReportType> = None;
    for name in pending.report_type.split(',').map(str::trim) {
        if name.is_empty() {
            continue;
        }
        match types.get(name) {
            Some(t) => {
                if first_type.is_none() {
                    first_type = Some(t);
                }
            }
            None => {
                return Err(BuildError::Invalid(format!("Report type not defined: {}", name)));
            }
        }
    }
    let Some(report_type) = first_type else {
        return Err(BuildError::Invalid("Report type not specified".to_string()));
    };

    let layout = match layouts.iter().find(|(c, _)| *c == kind.layout_class) {
        Some((_, layout)) => Arc::clone(layout),
        None => {
            let Some(registration) = catalog::find_layout(kind.layout_class) else {
                return Err(BuildError::Invalid(format!(
                    "ReportLayout class not found: {}",
                    kind.layout_class
                )));
            };
            let layout = Arc::new(build_layout(registration, None, default_style));
            layouts.push((registration.class_name, Arc::clone(&layout)));
            layout
        }
    };

    Ok(ReportFactory::new(&pending.name, &report_type.name, kind, layout)
        .with_class_name(&pending.class_name)
        .with_type_is_group(report_type.is_group)
        .with_menu_description(pending.menu_description)
        .with_title(pending.title)
        .with_subtitle(pending.subtitle)
        .with_columns(pending.columns.unwrap_or_default())
        .with_constraints(pending.constraints)
        .with_icon_selector(pending.icon_selector)
        .with_properties(pending.properties)
        .with_options(pending.options)
        .with_sys_admin_only(pending.sys_admin_only)
        .with_sortable(pending.sortable))
}

/// Shared access to the current registry.
///
/// Readers take a snapshot and keep it for the whole request; a reload
/// builds a complete new registry before swapping it in.
#[derive(Debug)]
pub struct RegistryHandle {
    current: RwLock<Arc<ReportRegistry>>,
}

impl Default for RegistryHandle {
    fn default() -> Self {
        Self::new(ReportRegistry::empty())
    }
}

impl RegistryHandle {
    pub fn new(registry: ReportRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<ReportRegistry> {
        Arc::clone(&self.current.read())
    }

    /// Publish `registry`, returning the one it replaced.
    pub fn replace(&self, registry: ReportRegistry) -> Arc<ReportRegistry> {
        let next = Arc::new(registry);
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Load `path` and publish the result.
    pub fn reload(&self, path: &Path, options: &LoadOptions) -> Arc<ReportRegistry> {
        let next = Arc::new(load_definition(path, options));
        *self.current.write() = Arc::clone(&next);
        next
    }
}

static GLOBAL_REGISTRY: LazyLock<RegistryHandle> = LazyLock::new(RegistryHandle::default);

/// The process-wide registry handle.
pub fn global_registry() -> &'static RegistryHandle {
    &GLOBAL_REGISTRY
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
