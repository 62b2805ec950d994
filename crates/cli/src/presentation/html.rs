// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTML report tables.

use std::io::Write;

use quick_xml::escape::escape;

use super::{BodyCell, BodyRow, HeaderCell, INDENT, NO_DATA_MESSAGE, PARTIAL_MESSAGE, ReportTable, write_str};
use crate::column::CellValue;
use crate::data::ReportData;
use crate::error::Result;
use crate::layout::{
    CSS_CLASS_BODY_TOTAL, CSS_CLASS_EVEN, CSS_CLASS_ODD, CSS_CLASS_TABLE, CSS_CLASS_TABLE_SORT,
    CSS_CLASS_TOTAL, CSS_CLASS_TOTAL_2,
};

const HTML_SP: &str = "&nbsp;";

pub(super) const CSS_HEADER_ROW: &str = "rptHdrRow";
const CSS_HEADER_COL_SORT: &str = "rptHdrCol_sort";
const CSS_HEADER_COL_NOSORT: &str = "rptHdrCol_nosort";
const CSS_BODY_COL: &str = "rptBodyCol";
const CSS_TOTAL_COL: &str = "rptTotalCol";
const CSS_TOTAL_COL_2: &str = "rptTotalCol2";

/// Encode `s` for HTML element text.
///
/// Leading and trailing spaces and every second space of a run become
/// `&nbsp;` so that browsers keep them. Newlines become `<BR>`.
pub fn html_filter(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    if s == " " {
        return HTML_SP.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let last = chars.len() - 1;
    let mut sb = String::with_capacity(s.len());
    let mut sp = 0;
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ' ' && (i == 0 || i == last) {
            sb.push_str(HTML_SP);
            continue;
        }
        sp = if ch == ' ' { sp + 1 } else { 0 };
        match ch {
            '<' => sb.push_str("&lt;"),
            '>' => sb.push_str("&gt;"),
            '&' => sb.push_str("&amp;"),
            '\u{b0}' => sb.push_str("&deg;"),
            '\'' => sb.push_str("&#39;"),
            '\n' => sb.push_str("<BR>"),
            '\r' => {}
            ' ' if sp % 2 == 0 => sb.push_str(HTML_SP),
            _ => sb.push(ch),
        }
    }
    sb
}

/// Like [`html_filter`], but an empty string renders as `&nbsp;`.
pub fn filter_text(s: &str) -> String {
    if s.is_empty() {
        HTML_SP.to_string()
    } else {
        html_filter(s)
    }
}

pub(super) fn indent(level: usize) -> String {
    " ".repeat(level * INDENT)
}

fn header_html(cells: &[HeaderCell], level: usize) -> String {
    let pfx = indent(level);
    let mut sb = String::new();
    sb.push_str(&format!("{pfx}<thead>\n"));
    sb.push_str(&format!("{pfx}<tr class=\"{}\">\n", CSS_HEADER_ROW));
    for cell in cells {
        sb.push_str(&indent(level + 1));
        sb.push_str(&format!(
            "<th id=\"{}\" class=\"{}\" nowrap",
            cell.field,
            header_class(cell)
        ));
        if cell.col_span > 1 {
            sb.push_str(&format!(" colSpan=\"{}\"", cell.col_span));
        }
        sb.push('>');
        sb.push_str(&filter_text(&cell.title));
        sb.push_str("</th>\n");
    }
    sb.push_str(&format!("{pfx}</tr>\n"));
    sb.push_str(&format!("{pfx}</thead>\n"));
    sb
}

pub(super) fn header_class(cell: &HeaderCell) -> &'static str {
    if cell.sortable {
        CSS_HEADER_COL_SORT
    } else {
        CSS_HEADER_COL_NOSORT
    }
}

pub(super) fn row_class(row: &BodyRow) -> String {
    if let Some(class) = &row.css_class {
        return class.clone();
    }
    let class = if row.is_totals {
        if row.index == 0 {
            CSS_CLASS_TOTAL
        } else {
            CSS_CLASS_TOTAL_2
        }
    } else if row.is_total() {
        CSS_CLASS_BODY_TOTAL
    } else if row.index % 2 == 0 {
        CSS_CLASS_ODD
    } else {
        CSS_CLASS_EVEN
    };
    class.to_string()
}

/// Cell class: the value's own, else the row's, else by section.
pub(super) fn cell_class(row: &BodyRow, row_class: &str, cell: &BodyCell) -> String {
    if let Some(class) = cell.value.rich().and_then(|r| r.css_class()) {
        return class.to_string();
    }
    if row.css_class.is_some() {
        return row_class.to_string();
    }
    let class = if !row.is_total() {
        CSS_BODY_COL
    } else if row.index == 0 {
        CSS_TOTAL_COL
    } else {
        CSS_TOTAL_COL_2
    };
    class.to_string()
}

fn cell_value_html(value: &CellValue) -> String {
    let Some(rich) = value.rich() else {
        return filter_text(&value.to_string());
    };
    let text = match rich.image_url() {
        Some(url) => format!("<img src='{}'/>", url),
        None => filter_text(rich.value()),
    };
    match rich.link_url() {
        Some(url) if url.starts_with("javascript:") => {
            format!("<span class='spanLink' onclick=\"{}\">{}</span>", url, text)
        }
        Some(url) => {
            let target = rich
                .link_target()
                .map(|t| format!(" target=\"{}\"", t))
                .unwrap_or_default();
            format!(
                "<a href=\"{}\"{} style=\"text-decoration: none;\">{}</a>",
                url, target, text
            )
        }
        None => text,
    }
}

fn row_html(row: &BodyRow, level: usize) -> String {
    let row_class = row_class(row);
    let mut sb = format!("{}<tr class=\"{}\">\n", indent(level), row_class);
    for cell in &row.cells {
        let rich = cell.value.rich();
        let class = cell_class(row, &row_class, cell);
        sb.push_str(&indent(level + 1));
        sb.push_str(&format!("<td id=\"{}\" class=\"{}\" nowrap", cell.field, class));
        if let Some(rich) = rich {
            if rich.has_style() {
                sb.push_str(&format!(" style=\"{}\"", rich.style_string()));
            }
            if let Some(key) = rich.sort_key() {
                sb.push_str(&format!(" sorttable_customkey=\"{}\"", escape(key)));
            }
        }
        if cell.col_span > 1 {
            sb.push_str(&format!(" colspan=\"{}\"", cell.col_span));
        }
        sb.push('>');
        sb.push_str(&cell_value_html(&cell.value));
        sb.push_str("</td>\n");
    }
    sb.push_str(&format!("{}</tr>\n", indent(level)));
    sb
}

fn banner(class: &str, message: &str) -> String {
    format!(
        "<tr>\n<td colSpan='3'><H2 class=\"{}\">{}</H2></td>\n</tr>\n",
        class, message
    )
}

fn popup_link(url: &str, window: &str, width: u32, height: u32, text: &str) -> String {
    format!(
        "<span class='spanLink' onclick=\"javascript:openResizableWindow('{}','{}',{},{});\">{}</span>",
        url, window, width, height, text
    )
}

fn action_links(report: &ReportData) -> Vec<String> {
    let mut links = Vec::new();
    if let Some(url) = report.graph_url() {
        let desc = report.graph_link_description().unwrap_or_else(|| "Graph".to_string());
        links.push(popup_link(url, "ReportGraph", 730, 440, &filter_text(&desc)));
    }
    if let Some(url) = report.map_url() {
        let desc = report.map_link_description().unwrap_or_else(|| "Map".to_string());
        links.push(popup_link(url, "ReportMap", 700, 500, &filter_text(&desc)));
    }
    if report.request().show_kml() {
        if let Some(url) = report.kml_url() {
            let desc = report.kml_link_description().unwrap_or_else(|| "KML".to_string());
            links.push(format!(
                "<a href='{}' target='_blank'>{}</a>",
                url,
                filter_text(&desc)
            ));
        }
    }
    links
}

/// One titled report table. `ndx` is the device section, or -1 when unsplit.
fn write_section(
    table: &mut ReportTable,
    report: &ReportData,
    email: bool,
    ndx: isize,
    out: &mut dyn Write,
) -> Result<usize> {
    let mut sb = String::new();
    sb.push_str("<center>\n");
    sb.push_str("<table cellspacing='0' cellpadding='0' border='0'>\n");
    sb.push_str(&format!(
        "<tr><td colSpan='3'><H1 class=\"rptTitle\">{}</H1></td></tr>\n",
        filter_text(&report.report_title())
    ));

    sb.push_str("<tr>\n");
    let refresh = match report.refresh_url() {
        Some(url) if !email && ndx <= 0 => {
            format!("<a href='{}' target='_self'>Refresh</a>", url)
        }
        _ => HTML_SP.to_string(),
    };
    sb.push_str(&format!("<td>{}</td>\n", refresh));

    let subtitle = report.report_subtitle();
    sb.push_str("<td width='100%'>");
    if subtitle.is_empty() {
        sb.push_str(HTML_SP);
    } else {
        sb.push_str(&format!(
            "<H2 class=\"rptSubtitle\">{}</H2>",
            filter_text(&subtitle)
        ));
    }
    sb.push_str("</td>\n");

    let links = if !email && ndx < 0 {
        action_links(report)
    } else {
        Vec::new()
    };
    if links.is_empty() {
        sb.push_str(&format!("<td>{}</td>\n", HTML_SP));
    } else {
        sb.push_str(&format!("<td>{}</td>\n", links.join("&nbsp;&nbsp;")));
    }
    sb.push_str("</tr>\n");

    let table_class = if report.factory().is_sortable() {
        CSS_CLASS_TABLE_SORT
    } else {
        CSS_CLASS_TABLE
    };
    sb.push_str("<tr>\n<td colSpan='3'>\n");
    sb.push_str(&format!(
        "<table class='{}' width='100%' cellspacing='0' cellpadding='0' border='0'>\n",
        table_class
    ));
    sb.push_str("<!-- Report Header -->\n");
    sb.push_str(&header_html(&table.header_cells(report)?, 1));
    sb.push_str("<!-- Report Data -->\n");
    sb.push_str(&format!("{}<tbody>\n", indent(1)));
    write_str(out, &sb)?;

    let result = table.walk_body(report, true, &mut |row| write_str(out, &row_html(row, 1)))?;

    let mut sb = format!("{}</tbody>\n", indent(1));
    sb.push_str("</table>\n</td>\n</tr>\n");
    if result.count == 0 {
        sb.push_str(&banner("rptNoData", NO_DATA_MESSAGE));
    } else if result.partial {
        sb.push_str(&banner("rptPartial", PARTIAL_MESSAGE));
    }
    sb.push_str("</table>\n</center>\n");
    write_str(out, &sb)?;
    Ok(result.count)
}

/// Write the report as HTML tables.
///
/// Kinds limited to one device get one table per device, in description
/// order. `email` drops the refresh and action links.
pub(super) fn write_html(
    table: &mut ReportTable,
    report: &mut ReportData,
    email: bool,
    out: &mut dyn Write,
) -> Result<usize> {
    if !report.is_single_device_only() || report.device_count() <= 1 {
        return write_section(table, report, email, -1, out);
    }

    let ids: Vec<String> = report
        .devices()
        .holders(true)
        .iter()
        .map(|h| h.device_id().to_string())
        .collect();
    let count = write_sections(table, report, email, &ids, out);

    let devices = report.devices_mut();
    devices.clear();
    devices.add_ids(&ids);
    count
}

fn write_sections(
    table: &mut ReportTable,
    report: &mut ReportData,
    email: bool,
    ids: &[String],
    out: &mut dyn Write,
) -> Result<usize> {
    let mut count = 0;
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            write_str(out, "<br>\n")?;
        }
        report.devices_mut().set_device(id);
        count += write_section(table, report, email, i as isize, out)?;
    }
    Ok(count)
}

/// A standalone HTML page holding the report and its style.
pub fn html_page(report: &mut ReportData, email: bool) -> Result<(String, usize)> {
    let mut body: Vec<u8> = Vec::new();
    let count = write_html(&mut ReportTable::new(), report, email, &mut body)?;

    let mut page = String::from("<html>\n<head>\n");
    for file in report.layout().css_files(true) {
        page.push_str(&format!(
            "<link rel='stylesheet' type='text/css' href='{}'>\n",
            escape(file.as_str())
        ));
    }
    let mut style: Vec<u8> = Vec::new();
    report.write_report_style("html", &mut style)?;
    let style = String::from_utf8_lossy(&style);
    if !style.trim().is_empty() {
        page.push_str("<style type='text/css'>");
        page.push_str(&style);
        page.push_str("</style>\n");
    }
    page.push_str("</head>\n<body>\n");
    page.push_str(&String::from_utf8_lossy(&body));
    page.push_str("</body>\n</html>\n");
    Ok((page, count))
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
