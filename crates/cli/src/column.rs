// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report columns and the values rendered into their cells.

use std::fmt;

/// One output column as declared by a report definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportColumn {
    name: String,
    arg: String,
    title: Option<String>,
    col_span: usize,
    sortable: bool,
    blank_fill: String,
}

impl ReportColumn {
    pub fn new(name: &str, arg: &str, title: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            arg: arg.to_string(),
            title: title.filter(|t| !t.is_empty()).map(str::to_string),
            col_span: 1,
            sortable: true,
            blank_fill: String::new(),
        }
    }

    /// Parse a `name[:arg]` token.
    pub fn from_token(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, arg)) => Self::new(name.trim(), arg.trim(), None),
            None => Self::new(token.trim(), "", None),
        }
    }

    pub fn with_col_span(mut self, span: usize) -> Self {
        self.col_span = span.max(1);
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_blank_fill(mut self, filler: &str) -> Self {
        self.blank_fill = filler.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arg(&self) -> &str {
        &self.arg
    }

    /// `name:arg`, or just `name` when there is no argument.
    pub fn key_name(&self) -> String {
        if self.arg.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.name, self.arg)
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn col_span(&self) -> usize {
        self.col_span
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn blank_fill(&self) -> &str {
        &self.blank_fill
    }

    /// Cell returned when a row has nothing for this column.
    pub fn blank(&self) -> CellValue {
        if self.blank_fill.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(self.blank_fill.clone())
        }
    }
}

impl fmt::Display for ReportColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.arg)?;
        if let Some(title) = &self.title {
            write!(f, " - {}", title)?;
        }
        Ok(())
    }
}

pub const LINK_TARGET_BLANK: &str = "_blank";
pub const LINK_TARGET_TOP: &str = "_top";
pub const TEXT_DECORATION_UNDERLINE: &str = "underline";
pub const TEXT_DECORATION_OVERLINE: &str = "overline";
pub const TEXT_DECORATION_BLINK: &str = "blink";
pub const FONT_WEIGHT_BOLD: &str = "bold";
pub const FONT_STYLE_ITALIC: &str = "italic";

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.trim().is_empty())
}

/// Presentation attributes for a single cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValue {
    value: Option<String>,
    sort_key: Option<String>,
    css_class: Option<String>,
    foreground: Option<String>,
    background: Option<String>,
    font_weight: Option<String>,
    font_style: Option<String>,
    text_decoration: Option<String>,
    image_url: Option<String>,
    link_url: Option<String>,
    link_target: Option<String>,
}

impl ColumnValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn set_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    pub fn set_sort_key(mut self, key: impl ToString) -> Self {
        self.sort_key = Some(key.to_string());
        self
    }

    pub fn css_class(&self) -> Option<&str> {
        non_blank(&self.css_class)
    }

    pub fn set_css_class(mut self, class: &str) -> Self {
        self.css_class = Some(class.trim().to_string());
        self
    }

    pub fn foreground(&self) -> Option<&str> {
        non_blank(&self.foreground)
    }

    pub fn set_foreground(mut self, color: &str) -> Self {
        self.foreground = Some(color.to_string());
        self
    }

    pub fn background(&self) -> Option<&str> {
        non_blank(&self.background)
    }

    pub fn set_background(mut self, color: &str) -> Self {
        self.background = Some(color.to_string());
        self
    }

    pub fn font_weight(&self) -> Option<&str> {
        non_blank(&self.font_weight)
    }

    pub fn set_font_weight(mut self, weight: &str) -> Self {
        self.font_weight = Some(weight.to_string());
        self
    }

    pub fn set_bold(self) -> Self {
        self.set_font_weight(FONT_WEIGHT_BOLD)
    }

    pub fn font_style(&self) -> Option<&str> {
        non_blank(&self.font_style)
    }

    pub fn set_font_style(mut self, style: &str) -> Self {
        self.font_style = Some(style.to_string());
        self
    }

    pub fn set_italic(self) -> Self {
        self.set_font_style(FONT_STYLE_ITALIC)
    }

    pub fn text_decoration(&self) -> Option<&str> {
        non_blank(&self.text_decoration)
    }

    pub fn set_text_decoration(mut self, decoration: &str) -> Self {
        self.text_decoration = Some(decoration.to_string());
        self
    }

    pub fn image_url(&self) -> Option<&str> {
        non_blank(&self.image_url)
    }

    pub fn set_image_url(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }

    pub fn link_url(&self) -> Option<&str> {
        non_blank(&self.link_url)
    }

    pub fn link_target(&self) -> Option<&str> {
        non_blank(&self.link_target)
    }

    pub fn set_link(mut self, url: &str, target: Option<&str>) -> Self {
        self.link_url = Some(url.to_string());
        self.link_target = target.map(str::to_string);
        self
    }

    pub fn has_style(&self) -> bool {
        self.foreground().is_some()
            || self.background().is_some()
            || self.text_decoration().is_some()
            || self.font_style().is_some()
            || self.font_weight().is_some()
    }

    /// Inline CSS for the set style attributes, empty when none are set.
    pub fn style_string(&self) -> String {
        let mut sb = String::new();
        let parts = [
            ("color", self.foreground()),
            ("background-color", self.background()),
            ("text-decoration", self.text_decoration()),
            ("font-style", self.font_style()),
            ("font-weight", self.font_weight()),
        ];
        for (prop, value) in parts {
            if let Some(v) = value {
                sb.push_str(prop);
                sb.push(':');
                sb.push_str(v);
                sb.push(';');
            }
        }
        sb
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// A value produced for one cell of one row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Rich(ColumnValue),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn rich(&self) -> Option<&ColumnValue> {
        match self {
            CellValue::Rich(cv) => Some(cv),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.to_string().trim().is_empty()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<ColumnValue> for CellValue {
    fn from(cv: ColumnValue) -> Self {
        CellValue::Rich(cv)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Whole numbers print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Rich(cv) => f.write_str(cv.value()),
        }
    }
}

#[cfg(test)]
#[path = "column_tests.rs"]
mod tests;
