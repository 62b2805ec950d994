// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Date/time patterns and time zones for report text.
//!
//! Report definitions carry `SimpleDateFormat`-style patterns such as
//! `yyyy/MM/dd HH:mm:ss`; they are translated to chrono format strings here.
//! Zones are fixed offsets (`UTC`, `GMT-08:00`, `+05:30`).

use chrono::{DateTime, Days, FixedOffset, NaiveTime, Offset, TimeZone, Utc};

pub const DEFAULT_DATE_FORMAT: &str = "yyyy/MM/dd";
pub const DEFAULT_TIME_FORMAT: &str = "HH:mm:ss";

/// A named fixed-offset zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    name: String,
    offset: FixedOffset,
}

impl Default for Zone {
    fn default() -> Self {
        Self::utc()
    }
}

impl Zone {
    pub fn utc() -> Self {
        Self {
            name: "UTC".to_string(),
            offset: utc_offset(),
        }
    }

    /// Parse a zone name, falling back to UTC when it is not understood.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match parse_offset(trimmed) {
            Some(offset) => Self {
                name: trimmed.to_string(),
                offset,
            },
            None => {
                tracing::warn!("Unsupported time zone '{}', using UTC", trimmed);
                Self::utc()
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    fn datetime(&self, ts: i64) -> Option<DateTime<FixedOffset>> {
        Utc.timestamp_opt(ts, 0)
            .single()
            .map(|dt| dt.with_timezone(&self.offset))
    }

    /// Format epoch seconds with a Java-style pattern.
    pub fn format(&self, ts: i64, pattern: &str) -> String {
        match self.datetime(ts) {
            Some(dt) => dt.format(&to_chrono_format(pattern, &self.name)).to_string(),
            None => String::new(),
        }
    }

    /// First second of the day holding `ts`.
    pub fn day_start(&self, ts: i64) -> i64 {
        match self.datetime(ts) {
            Some(dt) => self
                .offset
                .from_local_datetime(&dt.date_naive().and_time(NaiveTime::MIN))
                .single()
                .map_or(ts, |d| d.timestamp()),
            None => ts,
        }
    }

    /// Last second of the day holding `ts`.
    pub fn day_end(&self, ts: i64) -> i64 {
        let Some(dt) = self.datetime(ts) else {
            return ts;
        };
        dt.date_naive()
            .checked_add_days(Days::new(1))
            .and_then(|next| {
                self.offset
                    .from_local_datetime(&next.and_time(NaiveTime::MIN))
                    .single()
            })
            .map_or(ts, |d| d.timestamp() - 1)
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

fn parse_offset(name: &str) -> Option<FixedOffset> {
    let upper = name.to_ascii_uppercase();
    let rest = ["UTC", "GMT", "Z"]
        .iter()
        .find_map(|p| upper.strip_prefix(p))
        .unwrap_or(&upper);
    if rest.is_empty() {
        return Some(utc_offset());
    }
    let (sign, digits) = match rest.as_bytes().first() {
        Some(b'+') => (1, &rest[1..]),
        Some(b'-') => (-1, &rest[1..]),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None if digits.len() > 2 => (
            digits[..digits.len() - 2].parse::<i32>().ok()?,
            digits[digits.len() - 2..].parse::<i32>().ok()?,
        ),
        None => (digits.parse::<i32>().ok()?, 0),
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Translate a Java date pattern into a chrono format string.
///
/// `z` expands to `zone_name`; quoted runs are literal.
pub fn to_chrono_format(pattern: &str, zone_name: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }
        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }
        let mut run = 1;
        while chars.get(i + run) == Some(&c) {
            run += 1;
        }
        match (c, run) {
            ('y', 2) => out.push_str("%y"),
            ('y', _) => out.push_str("%Y"),
            ('M', 1) => out.push_str("%-m"),
            ('M', 2) => out.push_str("%m"),
            ('M', 3) => out.push_str("%b"),
            ('M', _) => out.push_str("%B"),
            ('d', 1) => out.push_str("%-d"),
            ('d', _) => out.push_str("%d"),
            ('H', 1) => out.push_str("%-H"),
            ('H', _) => out.push_str("%H"),
            ('h', 1) => out.push_str("%-I"),
            ('h', _) => out.push_str("%I"),
            ('m', _) => out.push_str("%M"),
            ('s', _) => out.push_str("%S"),
            ('S', _) => out.push_str("%3f"),
            ('a', _) => out.push_str("%p"),
            ('E', 1..=3) => out.push_str("%a"),
            ('E', _) => out.push_str("%A"),
            ('z', _) | ('Z', _) => zone_name.chars().for_each(|zc| push_literal(&mut out, zc)),
            _ => (0..run).for_each(|_| push_literal(&mut out, c)),
        }
        i += run;
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
#[path = "timefmt_tests.rs"]
mod tests;
