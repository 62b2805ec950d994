// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! XML report documents, including the URL, email and embedded HTML variants.
//!
//! SOAP output entity-escapes the markup itself so the whole document can be
//! carried as text inside a SOAP response, and drops newlines and indents.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use quick_xml::escape::escape;

use super::html::{self, CSS_HEADER_ROW, cell_class, header_class, indent, row_class};
use super::{BodyRow, HeaderCell, ReportFormat, ReportTable, write_str};
use crate::column::{CellValue, format_number};
use crate::data::ReportData;
use crate::error::Result;
use crate::mail::{Attachment, MailMessage};

const TAG_REPORT: &str = "Report";
const TAG_ACCOUNT: &str = "Account";
const TAG_TIME_FROM: &str = "TimeFrom";
const TAG_TIME_TO: &str = "TimeTo";
const TAG_VALID_GPS_REQUIRED: &str = "ValidGPSRequired";
const TAG_SELECTION_LIMIT: &str = "SelectionLimit";
const TAG_ASCENDING: &str = "Ascending";
const TAG_REPORT_LIMIT: &str = "ReportLimit";
const TAG_WHERE: &str = "Where";
const TAG_RULE_SELECTOR: &str = "RuleSelector";
const TAG_TITLE: &str = "Title";
const TAG_SUBTITLE: &str = "Subtitle";
const TAG_REPORT_URL: &str = "ReportUrl";
const TAG_REPORT_EMAIL: &str = "ReportEmail";
const TAG_REPORT_HTML: &str = "ReportHtml";
const TAG_REPORT_HEADER: &str = "ReportHeader";
const TAG_HEADER_ROW: &str = "HeaderRow";
const TAG_HEADER_COLUMN: &str = "HeaderColumn";
const TAG_REPORT_BODY: &str = "ReportBody";
const TAG_BODY_ROW: &str = "BodyRow";
const TAG_BODY_COLUMN: &str = "BodyColumn";
const TAG_PARTIAL: &str = "Partial";

/// Time format of `TimeFrom` / `TimeTo` values.
const XML_TIME_FORMAT: &str = "yyyy/MM/dd,HH:mm:ss";

/// Length of each line of base64 embedded HTML.
const BASE64_LINE: usize = 100;

/// Characters left as-is in deep-link query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*');

fn is_plain(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ',' | '/' | '+' | ':' | '|' | '=' | ' ')
}

fn cdata(soap: bool, text: &str) -> String {
    let text = text.replace("]]>", "]]]]><![CDATA[>");
    if soap {
        format!("&lt;![CDATA[{}]]&gt;", text)
    } else {
        format!("<![CDATA[{}]]>", text)
    }
}

/// Element text for `s`: plain tokens as-is, anything else in a CDATA section.
///
/// Newlines inside CDATA are written as a literal `\n`.
pub fn xml_filter(soap: bool, s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    if s.chars().all(is_plain) {
        return s.to_string();
    }
    cdata(soap, &s.replace('\n', "\\n"))
}

/// Opening tag. `attrs` is written verbatim after the tag name.
pub fn start_tag(soap: bool, tag: &str, attrs: &str, self_close: bool, newline: bool) -> String {
    let mut sb = String::from(if soap { "&lt;" } else { "<" });
    sb.push_str(tag);
    if !attrs.is_empty() {
        if !attrs.starts_with(' ') {
            sb.push(' ');
        }
        sb.push_str(attrs);
    }
    if self_close {
        sb.push('/');
    }
    sb.push_str(if soap { "&gt;" } else { ">" });
    if !soap && newline {
        sb.push('\n');
    }
    sb
}

pub fn end_tag(soap: bool, tag: &str, newline: bool) -> String {
    let mut sb = String::from(if soap { "&lt;/" } else { "</" });
    sb.push_str(tag);
    sb.push_str(if soap { "&gt;" } else { ">" });
    if !soap && newline {
        sb.push('\n');
    }
    sb
}

/// ` name="value"`, or nothing for an empty value.
fn attr(name: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!(" {}=\"{}\"", name, escape(value))
    }
}

/// Writes tags at the prefix and markup style of one document.
struct XmlOut {
    soap: bool,
}

impl XmlOut {
    fn prefix(&self, level: usize) -> String {
        if self.soap { String::new() } else { indent(level) }
    }

    fn open(&self, level: usize, tag: &str, attrs: &str) -> String {
        format!("{}{}", self.prefix(level), start_tag(self.soap, tag, attrs, false, true))
    }

    fn close(&self, level: usize, tag: &str) -> String {
        format!("{}{}", self.prefix(level), end_tag(self.soap, tag, true))
    }

    /// `<tag attrs>value</tag>` on one line; `value` is already filtered.
    fn element(&self, level: usize, tag: &str, attrs: &str, value: &str) -> String {
        format!(
            "{}{}{}{}",
            self.prefix(level),
            start_tag(self.soap, tag, attrs, false, false),
            value,
            end_tag(self.soap, tag, true)
        )
    }
}

fn time_element(x: &XmlOut, level: usize, tag: &str, ts: i64, report: &ReportData) -> String {
    let zone = report.zone();
    let attrs = format!(
        "{}{}",
        attr("timestamp", &ts.to_string()),
        attr("timezone", zone.name())
    );
    let value = if ts > 0 {
        zone.format(ts, XML_TIME_FORMAT)
    } else {
        String::new()
    };
    x.element(level, tag, &attrs, &xml_filter(x.soap, &value))
}

fn preamble(x: &XmlOut, report: &ReportData, format: ReportFormat, level: usize) -> String {
    let soap = x.soap;
    let constraints = report.constraints();
    let pfx2 = level + 1;
    let mut sb = String::new();

    let attrs = format!(
        "{}{}{}",
        attr("name", report.report_name()),
        attr("type", report.report_type()),
        attr("format", format.as_str())
    );
    sb.push_str(&x.open(level, TAG_REPORT, &attrs));
    sb.push_str(&x.element(pfx2, TAG_ACCOUNT, "", &xml_filter(soap, report.account_id())));
    sb.push_str(&time_element(x, pfx2, TAG_TIME_FROM, constraints.time_start(), report));
    sb.push_str(&time_element(x, pfx2, TAG_TIME_TO, constraints.time_end(), report));
    sb.push_str(&x.element(
        pfx2,
        TAG_VALID_GPS_REQUIRED,
        "",
        &constraints.valid_gps_required().to_string(),
    ));
    sb.push_str(&x.element(
        pfx2,
        TAG_SELECTION_LIMIT,
        &attr("type", constraints.selection_limit_type().as_str()),
        &constraints.selection_limit().to_string(),
    ));
    sb.push_str(&x.element(
        pfx2,
        TAG_ASCENDING,
        "",
        &constraints.order_ascending().to_string(),
    ));
    sb.push_str(&x.element(
        pfx2,
        TAG_REPORT_LIMIT,
        "",
        &constraints.report_limit().to_string(),
    ));
    if constraints.has_where() {
        sb.push_str(&x.element(pfx2, TAG_WHERE, "", &xml_filter(soap, &report.where_selector())));
    }
    if constraints.has_rule_selector() {
        sb.push_str(&x.element(
            pfx2,
            TAG_RULE_SELECTOR,
            "",
            &xml_filter(soap, constraints.rule_selector()),
        ));
    }
    sb.push_str(&x.element(pfx2, TAG_TITLE, "", &xml_filter(soap, &report.report_title())));
    sb.push_str(&x.element(
        pfx2,
        TAG_SUBTITLE,
        "",
        &xml_filter(soap, &report.report_subtitle()),
    ));
    sb
}

fn header_xml(x: &XmlOut, cells: &[HeaderCell], level: usize) -> String {
    let mut sb = x.open(level, TAG_REPORT_HEADER, "");
    sb.push_str(&x.open(level + 1, TAG_HEADER_ROW, &attr("class", CSS_HEADER_ROW)));
    for cell in cells {
        let mut attrs = format!("{}{}", attr("id", &cell.field), attr("class", header_class(cell)));
        if cell.col_span > 1 {
            attrs.push_str(&attr("colspan", &cell.col_span.to_string()));
        }
        sb.push_str(&x.element(
            level + 2,
            TAG_HEADER_COLUMN,
            &attrs,
            &xml_filter(x.soap, &cell.title),
        ));
    }
    sb.push_str(&x.close(level + 1, TAG_HEADER_ROW));
    sb.push_str(&x.close(level, TAG_REPORT_HEADER));
    sb
}

fn cell_text(soap: bool, value: &CellValue) -> String {
    match value {
        CellValue::Number(n) => format_number(*n),
        v if v.is_blank() => String::new(),
        v => xml_filter(soap, &v.to_string()),
    }
}

fn row_xml(x: &XmlOut, row: &BodyRow, level: usize) -> String {
    let tr_class = row_class(row);
    let mut sb = x.open(level, TAG_BODY_ROW, &attr("class", &tr_class));
    for cell in &row.cells {
        let mut attrs = format!(
            "{}{}",
            attr("id", &cell.field),
            attr("class", &cell_class(row, &tr_class, cell))
        );
        if let Some(rich) = cell.value.rich() {
            attrs.push_str(&attr("style", &rich.style_string()));
        }
        if cell.col_span > 1 {
            attrs.push_str(&attr("colspan", &cell.col_span.to_string()));
        }
        sb.push_str(&x.element(
            level + 1,
            TAG_BODY_COLUMN,
            &attrs,
            &cell_text(x.soap, &cell.value),
        ));
    }
    sb.push_str(&x.close(level, TAG_BODY_ROW));
    sb
}

/// Deep link that re-runs this report as embedded HTML.
///
/// Blank values are left out; the device is replaced by the group when the
/// report runs over a device group.
pub fn report_url(report: &ReportData) -> String {
    let constraints = report.constraints();
    let devices = report.devices();
    let positive = |n: i64| if n > 0 { n.to_string() } else { String::new() };

    let mut args: Vec<(&str, String)> = vec![
        ("account", report.account_id().to_string()),
        ("user", report.user_id().to_string()),
        ("page", "report.show".to_string()),
    ];
    if devices.is_device_group() {
        args.push(("group", devices.group_id().to_string()));
    } else {
        args.push(("device", devices.first_device_id().to_string()));
    }
    args.extend([
        ("fr", positive(constraints.time_start())),
        ("to", positive(constraints.time_end())),
        ("tz", report.zone().name().to_string()),
        ("rpt", report.report_name().to_string()),
        ("lim", positive(constraints.report_limit())),
        ("ltp", constraints.selection_limit_type().as_str().to_string()),
        ("fmt", ReportFormat::Ehtml.as_str().to_string()),
    ]);

    let query: Vec<String> = args
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| format!("{}={}", k, utf8_percent_encode(v, QUERY_VALUE)))
        .collect();
    let base = report.request().base_url();
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, sep, query.join("&"))
}

/// Email the HTML report, returning `(sent, message)`.
fn send_report_email(report: &mut ReportData) -> Result<(bool, String)> {
    let to = match report.constraints().email_addresses() {
        Some(list) if !list.trim().is_empty() => list.trim().to_string(),
        _ => report.request().report_email().to_string(),
    };
    let from = report.request().mail_from().to_string();
    if from.is_empty() {
        return Ok((false, "'From' email address not specified".to_string()));
    }
    let recipients = MailMessage::parse_recipients(&to);
    if recipients.is_empty() {
        return Ok((false, "No email recipients specified".to_string()));
    }
    let Some(mailer) = report.request().mailer().cloned() else {
        tracing::warn!("No mail sender installed");
        return Ok((false, "Internal SendMail error".to_string()));
    };

    let (page, _) = html::html_page(report, true)?;
    let subject = format!("Report: {}", report.report_title());
    let message = MailMessage {
        from,
        to: recipients,
        subject: subject.clone(),
        body: subject,
        attachment: Some(Attachment {
            name: format!("{}.html", report.report_name()),
            content_type: "text/html".to_string(),
            data: page.into_bytes(),
        }),
    };
    match mailer.send(&message) {
        Ok(()) => Ok((true, format!("EMail sent: {}", to))),
        Err(e) => {
            tracing::error!("Unable to send report email: {}", e);
            Ok((false, "Internal SendMail error".to_string()))
        }
    }
}

fn embedded_html(soap: bool, page: &str) -> String {
    let encoded = STANDARD.encode(page.as_bytes());
    let mut text = String::from("\n");
    for line in encoded.as_bytes().chunks(BASE64_LINE) {
        text.push_str(&String::from_utf8_lossy(line));
        text.push('\n');
    }
    cdata(soap, &text)
}

/// Write the XML document for `format`, returning the number of detail records.
pub(super) fn write_xml(
    table: &mut ReportTable,
    report: &mut ReportData,
    format: ReportFormat,
    out: &mut dyn Write,
) -> Result<usize> {
    let x = XmlOut {
        soap: format == ReportFormat::Soap || report.is_soap_request(),
    };
    let level = 0;
    write_str(out, &preamble(&x, report, format, level))?;

    let mut count = 0;
    let mut partial = false;
    match format {
        ReportFormat::Url => {
            let url = report_url(report);
            write_str(out, &x.element(level + 1, TAG_REPORT_URL, "", &xml_filter(x.soap, &url)))?;
        }
        ReportFormat::Email => {
            let (sent, message) = send_report_email(report)?;
            write_str(
                out,
                &x.element(
                    level + 1,
                    TAG_REPORT_EMAIL,
                    &attr("sent", &sent.to_string()),
                    &xml_filter(x.soap, &message),
                ),
            )?;
        }
        ReportFormat::Ehtml => {
            // The page is embedded whole; no body rows are counted.
            let (page, _) = html::html_page(report, false)?;
            write_str(
                out,
                &x.element(
                    level + 1,
                    TAG_REPORT_HTML,
                    &attr("encoding", "base64"),
                    &embedded_html(x.soap, &page),
                ),
            )?;
        }
        _ => {
            let cells = table.header_cells(report)?;
            let mut sb = header_xml(&x, &cells, level + 1);
            sb.push_str(&x.open(level + 1, TAG_REPORT_BODY, ""));
            write_str(out, &sb)?;
            let result = table.walk_body(report, true, &mut |row| {
                write_str(out, &row_xml(&x, row, level + 2))
            })?;
            write_str(out, &x.close(level + 1, TAG_REPORT_BODY))?;
            count = result.count;
            partial = result.partial;
        }
    }

    let mut sb = x.element(level + 1, TAG_PARTIAL, "", &partial.to_string());
    sb.push_str(&x.close(level, TAG_REPORT));
    write_str(out, &sb)?;
    Ok(count)
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
