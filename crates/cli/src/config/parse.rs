// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Parse helper functions for configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{DataConfig, MailConfig, ReportsConfig};

/// Parse a TOML string value with a default function.
fn parse_string_or_else<F>(value: Option<&toml::Value>, default: F) -> String
where
    F: FnOnce() -> String,
{
    value
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_else(default)
}

/// Parse a TOML string value as Option<PathBuf>.
fn parse_path_option(value: Option<&toml::Value>) -> Option<PathBuf> {
    value.and_then(|v| v.as_str()).map(PathBuf::from)
}

/// Parse a TOML boolean with a default.
fn parse_bool_or(value: Option<&toml::Value>, default: bool) -> bool {
    value.and_then(|v| v.as_bool()).unwrap_or(default)
}

/// Warn about unknown configuration key.
pub(super) fn warn_unknown_key(path: &Path, key: &str) {
    eprintln!(
        "fleetreport: warning: {}: unrecognized field `{}` (ignored)",
        path.display(),
        key
    );
}

fn warn_unknown_in_table(path: &Path, section: &str, table: &toml::Table, known: &[&str]) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            warn_unknown_key(path, &format!("{}.{}", section, key));
        }
    }
}

/// Parse the `[reports]` table.
pub(super) fn parse_reports_config(value: Option<&toml::Value>, path: &Path) -> ReportsConfig {
    let Some(toml::Value::Table(t)) = value else {
        return ReportsConfig::default();
    };

    const KNOWN: &[&str] = &[
        "definition",
        "ignore_missing",
        "debug",
        "include_dir",
        "show_kml",
        "base_url",
        "rule_engine",
    ];
    warn_unknown_in_table(path, "reports", t, KNOWN);

    ReportsConfig {
        definition: parse_path_option(t.get("definition"))
            .unwrap_or_else(ReportsConfig::default_definition),
        ignore_missing: parse_bool_or(
            t.get("ignore_missing"),
            ReportsConfig::default_ignore_missing(),
        ),
        debug: parse_bool_or(t.get("debug"), false),
        include_dir: parse_path_option(t.get("include_dir")),
        show_kml: parse_bool_or(t.get("show_kml"), false),
        base_url: parse_string_or_else(t.get("base_url"), ReportsConfig::default_base_url),
        rule_engine: parse_string_or_else(
            t.get("rule_engine"),
            ReportsConfig::default_rule_engine,
        ),
    }
}

/// Parse the `[properties]` table. Non-string scalars are stringified.
pub(super) fn parse_properties(
    value: Option<&toml::Value>,
    path: &Path,
) -> BTreeMap<String, String> {
    let Some(toml::Value::Table(t)) = value else {
        return BTreeMap::new();
    };

    let mut props = BTreeMap::new();
    for (key, value) in t {
        let text = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            _ => {
                warn_unknown_key(path, &format!("properties.{}", key));
                continue;
            }
        };
        props.insert(key.clone(), text);
    }
    props
}

/// Parse the `[mail]` table.
pub(super) fn parse_mail_config(value: Option<&toml::Value>, path: &Path) -> MailConfig {
    let Some(toml::Value::Table(t)) = value else {
        return MailConfig::default();
    };
    warn_unknown_in_table(path, "mail", t, &["from", "outbox"]);

    MailConfig {
        from: parse_string_or_else(t.get("from"), MailConfig::default_from),
        outbox: parse_path_option(t.get("outbox")),
    }
}

/// Parse the `[data]` table.
pub(super) fn parse_data_config(value: Option<&toml::Value>, path: &Path) -> DataConfig {
    let Some(toml::Value::Table(t)) = value else {
        return DataConfig::default();
    };
    warn_unknown_in_table(path, "data", t, &["store"]);

    DataConfig {
        store: parse_path_option(t.get("store")).unwrap_or_else(DataConfig::default_store),
    }
}
