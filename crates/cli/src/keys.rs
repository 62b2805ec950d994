// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `${key:arg=default}` replacement in definition and header text.

use std::collections::BTreeMap;

pub const KEY_START: &str = "${";
pub const KEY_START_ALT: &str = "%{";
pub const KEY_END: &str = "}";
const KEY_START_ESC: char = '\\';

/// One `key[:arg][=default]` reference found in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRef<'a> {
    pub key: &'a str,
    pub arg: Option<&'a str>,
    /// Text after `=`, kept untrimmed.
    pub default: Option<&'a str>,
}

impl<'a> KeyRef<'a> {
    pub fn parse(body: &'a str) -> Self {
        let (key_arg, default) = match body.split_once('=') {
            Some((k, d)) => (k.trim(), Some(d)),
            None => (body, None),
        };
        let (key, arg) = match key_arg.split_once(':') {
            Some((k, a)) => (k.trim(), Some(a)),
            None => (key_arg.trim(), None),
        };
        Self { key, arg, default }
    }

    pub fn arg_or_empty(&self) -> &'a str {
        self.arg.unwrap_or("")
    }
}

/// Walk every reference opened by `start`, splicing in what `resolve` returns.
///
/// A backslash directly before the opener is consumed along with the
/// reference. Substituted text is not rescanned.
pub fn scan_keys<F>(text: &str, start: &str, mut resolve: F) -> String
where
    F: FnMut(&KeyRef<'_>, &str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(ks) = rest.find(start) {
        let body_start = ks + start.len();
        let Some(ke) = rest[body_start..].find(KEY_END).map(|i| body_start + i) else {
            break;
        };
        let mut prefix = &rest[..ks];
        if prefix.ends_with(KEY_START_ESC) {
            prefix = &prefix[..prefix.len() - KEY_START_ESC.len_utf8()];
        }
        out.push_str(prefix);
        let raw = &rest[ks..ke + KEY_END.len()];
        let key = KeyRef::parse(&rest[body_start..ke]);
        out.push_str(&resolve(&key, raw));
        rest = &rest[ke + KEY_END.len()..];
    }
    out.push_str(rest);
    out
}

/// Replace references using `lookup`; unresolved keys fall back to their
/// default, or nothing.
pub fn replace_keys<F>(text: &str, start: &str, mut lookup: F) -> String
where
    F: FnMut(&KeyRef<'_>) -> Option<String>,
{
    if !text.contains(start) {
        return text.to_string();
    }
    scan_keys(text, start, |key, _| {
        lookup(key).unwrap_or_else(|| key.default.unwrap_or("").to_string())
    })
}

/// Fill `${key}` references from `values`, leaving unknown references intact.
pub fn insert_key_values(text: &str, values: &BTreeMap<String, String>) -> String {
    if !text.contains(KEY_START) {
        return text.to_string();
    }
    scan_keys(text, KEY_START, |key, raw| match values.get(key.key) {
        Some(v) => v.clone(),
        None => match key.default {
            Some(d) => d.to_string(),
            None => raw.to_string(),
        },
    })
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
