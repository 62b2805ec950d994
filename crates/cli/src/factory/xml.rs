// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal element tree over quick-xml, enough for report definitions.

use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, MatchKind};
use quick_xml::events::Event;

use crate::error::{Error, Result};

#[allow(clippy::expect_used)]
static XML_ESCAPER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("valid patterns")
});

#[allow(clippy::expect_used)]
static XML_UNESCAPER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("valid patterns")
});

/// Escape the five XML special characters.
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Replace the five predefined entities; anything else is left as-is.
pub fn unescape_xml(s: &str) -> String {
    XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"])
}

/// Text of a `&name;` reference, `None` when it is not predefined or numeric.
fn resolve_entity(name: &str) -> Option<String> {
    let resolved = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(resolved.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlChild {
    Element(XmlNode),
    Text(String),
    CData(String),
}

/// One element with its attributes and children in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlChild>,
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(format!("invalid XML: {}", msg.into()))
}

fn utf8(bytes: &[u8], what: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| invalid(format!("invalid UTF-8 in {}", what)))
}

impl XmlNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<XmlNode> {
        let mut reader = quick_xml::Reader::from_reader(xml.as_bytes());
        let mut buf = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let mut node = XmlNode::new(&utf8(e.name().as_ref(), "tag name")?);
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| invalid(e.to_string()))?;
                        let key = utf8(attr.key.as_ref(), "attribute key")?;
                        let value = unescape_xml(&utf8(&attr.value, "attribute value")?);
                        node.attributes.push((key, value));
                    }
                    stack.push(node);
                }
                Ok(Event::Empty(ref e)) => {
                    let mut node = XmlNode::new(&utf8(e.name().as_ref(), "tag name")?);
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| invalid(e.to_string()))?;
                        let key = utf8(attr.key.as_ref(), "attribute key")?;
                        let value = unescape_xml(&utf8(&attr.value, "attribute value")?);
                        node.attributes.push((key, value));
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlChild::Element(node)),
                        None => return Ok(node),
                    }
                }
                Ok(Event::Text(ref t)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = unescape_xml(&utf8(t, "text")?);
                        current.push_text(&text);
                    }
                }
                Ok(Event::GeneralRef(ref r)) => {
                    if let Some(current) = stack.last_mut() {
                        let name = utf8(r, "entity reference")?;
                        match resolve_entity(&name) {
                            Some(text) => current.push_text(&text),
                            None => current.push_text(&format!("&{};", name)),
                        }
                    }
                }
                Ok(Event::CData(ref c)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = utf8(c, "CDATA")?;
                        current.children.push(XmlChild::CData(text));
                    }
                }
                Ok(Event::End(_)) => {
                    let Some(node) = stack.pop() else {
                        return Err(invalid("unbalanced end tag"));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlChild::Element(node)),
                        None => return Ok(node),
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(invalid(format!(
                        "{} at position {}",
                        e,
                        reader.error_position()
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        Err(invalid("no root element found"))
    }

    /// Adjacent text and entity pieces merge into one text child.
    fn push_text(&mut self, text: &str) {
        if let Some(XmlChild::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlChild::Text(text.to_string()));
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, `None` when absent or blank.
    pub fn attr_non_blank(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.trim().is_empty())
    }

    pub fn attr_bool(&self, name: &str, default: bool) -> bool {
        self.attr(name).map_or(default, |v| parse_bool(v, default))
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|c| match c {
            XmlChild::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements with the given tag name, ignoring case.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.elements().filter(move |e| e.is(name))
    }

    /// Concatenated text and CDATA content.
    ///
    /// With `newline`, each line is trimmed, blank lines are dropped and the
    /// rest are joined by `newline`. The result is always trimmed.
    pub fn text(&self, newline: Option<&str>) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                XmlChild::Text(t) | XmlChild::CData(t) => text.push_str(t),
                XmlChild::Element(_) => {}
            }
        }
        if let Some(sep) = newline {
            text = text
                .split(['\n', '\r'])
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(sep);
        }
        text.trim().to_string()
    }
}

/// Lenient boolean: true/yes/on/1 and false/no/off/0, else `default`.
pub fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => true,
        "false" | "no" | "off" | "0" => false,
        _ => default,
    }
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
