// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound mail for emailed reports.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Encoded attachment line length.
const BASE64_LINE: usize = 76;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

impl MailMessage {
    /// Recipients from a comma or semicolon separated list.
    pub fn parse_recipients(list: &str) -> Vec<String> {
        list.split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Delivers a message somewhere.
pub trait MailSender: Send + Sync {
    fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Writes each message as an `.eml` file into an outbox directory.
#[derive(Debug)]
pub struct FileMailSender {
    outbox: PathBuf,
    sequence: AtomicU64,
}

impl FileMailSender {
    pub fn new(outbox: &Path) -> Self {
        Self {
            outbox: outbox.to_path_buf(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }

    fn next_path(&self) -> PathBuf {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        self.outbox.join(format!("{}-{:04}.eml", stamp, seq))
    }
}

impl MailSender for FileMailSender {
    fn send(&self, message: &MailMessage) -> Result<()> {
        std::fs::create_dir_all(&self.outbox).map_err(|e| Error::Io {
            path: self.outbox.clone(),
            source: e,
        })?;
        let path = self.next_path();
        std::fs::write(&path, render_message(message)).map_err(|e| Error::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::info!("Mail written: {}", path.display());
        Ok(())
    }
}

/// RFC-822 text of `message`, attachment as a base64 MIME part.
pub fn render_message(message: &MailMessage) -> String {
    let mut out = String::new();
    out.push_str(&format!("From: {}\r\n", message.from));
    out.push_str(&format!("To: {}\r\n", message.to.join(", ")));
    out.push_str(&format!("Subject: {}\r\n", message.subject));
    out.push_str("MIME-Version: 1.0\r\n");

    let Some(attachment) = &message.attachment else {
        out.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
        out.push_str(&message.body);
        out.push_str("\r\n");
        return out;
    };

    let boundary = "----=_fleetreport_part";
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
        boundary
    ));
    out.push_str(&format!("--{}\r\n", boundary));
    out.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
    out.push_str(&message.body);
    out.push_str("\r\n");
    out.push_str(&format!("--{}\r\n", boundary));
    out.push_str(&format!(
        "Content-Type: {}; name=\"{}\"\r\n",
        attachment.content_type, attachment.name
    ));
    out.push_str("Content-Transfer-Encoding: base64\r\n");
    out.push_str(&format!(
        "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
        attachment.name
    ));
    let encoded = STANDARD.encode(&attachment.data);
    for line in encoded.as_bytes().chunks(BASE64_LINE) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push_str("\r\n");
    }
    out.push_str(&format!("--{}--\r\n", boundary));
    out
}

#[cfg(test)]
#[path = "mail_tests.rs"]
mod tests;
