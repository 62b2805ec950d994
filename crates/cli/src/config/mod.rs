// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration parsing and validation.
//!
//! Handles fleetreport.toml parsing with version validation and unknown key warnings.

mod parse;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use parse::{
    parse_data_config, parse_mail_config, parse_properties, parse_reports_config, warn_unknown_key,
};

/// Minimum config structure for version checking.
#[derive(Deserialize)]
struct VersionOnly {
    version: Option<i64>,
}

/// Config with flexible parsing that captures unknown keys.
#[derive(Deserialize)]
struct FlexibleConfig {
    #[serde(default)]
    reports: Option<toml::Value>,

    #[serde(default)]
    properties: Option<toml::Value>,

    #[serde(default)]
    mail: Option<toml::Value>,

    #[serde(default)]
    data: Option<toml::Value>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

/// Full configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Config file version (must be 1).
    pub version: i64,

    /// Report definition loading and rendering.
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Runtime overrides for definition properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Outbound mail for the `email` format.
    #[serde(default)]
    pub mail: MailConfig,

    /// Fleet data source.
    #[serde(default)]
    pub data: DataConfig,
}

impl Config {
    /// Look up a runtime override for a definition property.
    ///
    /// Keys may be written with or without the `ReportDefinition.` prefix;
    /// the prefixed form wins when both are present.
    pub fn property_override(&self, key: &str) -> Option<&str> {
        let prefixed = format!("{}{}", PROPERTY_PREFIX, key);
        self.properties
            .get(&prefixed)
            .or_else(|| self.properties.get(key))
            .map(String::as_str)
    }

    /// Resolve a path from the config relative to the directory holding it.
    pub fn resolve_path(&self, base: Option<&Path>, path: &Path) -> PathBuf {
        match base {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Prefix that scopes runtime properties to the report definition.
pub const PROPERTY_PREFIX: &str = "ReportDefinition.";

/// Report definition configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportsConfig {
    /// Path to the report definition XML.
    #[serde(default = "ReportsConfig::default_definition")]
    pub definition: PathBuf,

    /// Skip reports whose kind is not registered instead of flagging an error.
    #[serde(default = "ReportsConfig::default_ignore_missing")]
    pub ignore_missing: bool,

    /// Surface optional-but-missing kinds as warnings.
    #[serde(default)]
    pub debug: bool,

    /// Directory searched for `<Include>` files.
    #[serde(default)]
    pub include_dir: Option<PathBuf>,

    /// Offer a KML link on reports that support it.
    #[serde(default)]
    pub show_kml: bool,

    /// Base URL used to build report deep links.
    #[serde(default = "ReportsConfig::default_base_url")]
    pub base_url: String,

    /// Name of the installed rule engine.
    #[serde(default = "ReportsConfig::default_rule_engine")]
    pub rule_engine: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            definition: Self::default_definition(),
            ignore_missing: Self::default_ignore_missing(),
            debug: false,
            include_dir: None,
            show_kml: false,
            base_url: Self::default_base_url(),
            rule_engine: Self::default_rule_engine(),
        }
    }
}

impl ReportsConfig {
    pub(crate) fn default_definition() -> PathBuf {
        PathBuf::from("reports.xml")
    }

    pub(crate) fn default_ignore_missing() -> bool {
        true
    }

    pub(crate) fn default_base_url() -> String {
        "http://localhost:8080/track/Track".to_string()
    }

    pub(crate) fn default_rule_engine() -> String {
        crate::filter::SIMPLE_RULE_ENGINE.to_string()
    }
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    /// Sender address on emailed reports.
    #[serde(default = "MailConfig::default_from")]
    pub from: String,

    /// Directory the file mail sender writes messages to.
    #[serde(default)]
    pub outbox: Option<PathBuf>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: Self::default_from(),
            outbox: None,
        }
    }
}

impl MailConfig {
    pub(crate) fn default_from() -> String {
        "reports@localhost".to_string()
    }
}

/// Fleet data configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// JSON file holding accounts, devices and events.
    #[serde(default = "DataConfig::default_store")]
    pub store: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            store: Self::default_store(),
        }
    }
}

impl DataConfig {
    pub(crate) fn default_store() -> PathBuf {
        PathBuf::from("fleet.json")
    }
}

/// Supported config version.
pub const SUPPORTED_VERSION: i64 = 1;

/// Known top-level keys in the config.
const KNOWN_KEYS: &[&str] = &["version", "reports", "properties", "mail", "data"];

fn config_error(path: &Path, message: impl ToString) -> Error {
    Error::Config {
        message: message.to_string(),
        path: Some(path.to_path_buf()),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reject documents without `version` or with one this build can't read.
fn check_version(content: &str, path: &Path) -> Result<i64> {
    let header: VersionOnly = toml::from_str(content).map_err(|e| config_error(path, e))?;
    match header.version {
        None => Err(config_error(path, "missing required field: version")),
        Some(SUPPORTED_VERSION) => Ok(SUPPORTED_VERSION),
        Some(other) => Err(config_error(
            path,
            format!("unsupported config version {} (supported: {})", other, SUPPORTED_VERSION),
        )),
    }
}

/// Load and validate config from a file path.
pub fn load(path: &Path) -> Result<Config> {
    parse(&read(path)?, path)
}

/// Load config with warnings for unknown keys.
pub fn load_with_warnings(path: &Path) -> Result<Config> {
    parse_with_warnings(&read(path)?, path)
}

/// Parse config strictly; unknown keys are errors.
pub fn parse(content: &str, path: &Path) -> Result<Config> {
    check_version(content, path)?;
    toml::from_str(content).map_err(|e| config_error(path, e))
}

/// Parse config, warning about unknown keys instead of failing on them.
pub fn parse_with_warnings(content: &str, path: &Path) -> Result<Config> {
    let version = check_version(content, path)?;
    let flexible: FlexibleConfig = toml::from_str(content).map_err(|e| config_error(path, e))?;

    let unknown_keys: BTreeSet<&String> = flexible
        .unknown
        .keys()
        .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
        .collect();
    for key in unknown_keys {
        warn_unknown_key(path, key);
    }

    Ok(Config {
        version,
        reports: parse_reports_config(flexible.reports.as_ref(), path),
        properties: parse_properties(flexible.properties.as_ref(), path),
        mail: parse_mail_config(flexible.mail.as_ref(), path),
        data: parse_data_config(flexible.data.as_ref(), path),
    })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
