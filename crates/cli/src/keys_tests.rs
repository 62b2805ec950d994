// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    bare = { "deviceId", "deviceId", None, None },
    with_arg = { " speed :mph", "speed", Some("mph"), None },
    with_default = { "title = Fleet ", "title", None, Some(" Fleet ") },
    all_parts = { "kph:100=fast", "kph", Some("100"), Some("fast") },
)]
fn key_ref_parse(body: &str, key: &str, arg: Option<&str>, default: Option<&str>) {
    let parsed = KeyRef::parse(body);
    assert_eq!(parsed.key, key);
    assert_eq!(parsed.arg, arg);
    assert_eq!(parsed.default, default);
}

#[test]
fn replace_keys_uses_lookup_then_default() {
    let out = replace_keys("A ${one} B ${two=dflt} C ${three}", KEY_START, |k| {
        (k.key == "one").then(|| "1".to_string())
    });
    assert_eq!(out, "A 1 B dflt C ");
}

#[test]
fn replace_keys_alternate_opener() {
    let out = replace_keys("over %{kph:100}", KEY_START_ALT, |k| {
        Some(format!("{}={}", k.key, k.arg_or_empty()))
    });
    assert_eq!(out, "over kph=100");
}

#[test]
fn escaped_opener_consumes_backslash() {
    let out = replace_keys(r"x \${a} y", KEY_START, |_| Some("A".into()));
    assert_eq!(out, "x A y");
}

#[test]
fn unterminated_reference_is_left_alone() {
    let out = replace_keys("x ${a y", KEY_START, |_| Some("A".into()));
    assert_eq!(out, "x ${a y");
}

#[test]
fn substituted_text_is_not_rescanned() {
    let out = replace_keys("${a}", KEY_START, |_| Some("${a}".into()));
    assert_eq!(out, "${a}");
}

#[test]
fn insert_key_values_keeps_unknown_tokens() {
    let mut values = BTreeMap::new();
    values.insert("limit".to_string(), "25".to_string());
    let out = insert_key_values("${limit} of ${unknown} or ${missing=5}", &values);
    assert_eq!(out, "25 of ${unknown} or 5");
}
