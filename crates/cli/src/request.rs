// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-request context a report is created and rendered against.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::filter::RuleEngine;
use crate::mail::MailSender;
use crate::model::{Account, FleetStore, SpeedUnits, User};
use crate::timefmt::Zone;

/// Who is asking, in which zone, and which collaborators are installed.
#[derive(Clone)]
pub struct RequestContext {
    store: Arc<dyn FleetStore>,
    account: Account,
    user: Option<User>,
    zone: Zone,
    rule_engine: Option<Arc<dyn RuleEngine>>,
    mailer: Option<Arc<dyn MailSender>>,
    mail_from: String,
    base_url: String,
    show_kml: bool,
    soap: bool,
    key_values: BTreeMap<String, String>,
}

impl RequestContext {
    /// Context for `account`, in the account's time zone.
    pub fn new(store: Arc<dyn FleetStore>, account: Account) -> Self {
        let zone = Zone::parse(&account.time_zone);
        Self {
            store,
            account,
            user: None,
            zone,
            rule_engine: None,
            mailer: None,
            mail_from: String::new(),
            base_url: String::new(),
            show_kml: false,
            soap: false,
            key_values: BTreeMap::new(),
        }
    }

    pub fn with_user(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_rule_engine(mut self, engine: Option<Arc<dyn RuleEngine>>) -> Self {
        self.rule_engine = engine;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn MailSender>, from: &str) -> Self {
        self.mailer = Some(mailer);
        self.mail_from = from.trim().to_string();
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim().to_string();
        self
    }

    pub fn with_show_kml(mut self, show: bool) -> Self {
        self.show_kml = show;
        self
    }

    /// Markup in XML output is entity-escaped for embedding in a SOAP body.
    pub fn with_soap(mut self, soap: bool) -> Self {
        self.soap = soap;
        self
    }

    pub fn with_key_value(mut self, key: &str, value: &str) -> Self {
        self.key_values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn store(&self) -> &Arc<dyn FleetStore> {
        &self.store
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn rule_engine(&self) -> Option<&Arc<dyn RuleEngine>> {
        self.rule_engine.as_ref()
    }

    pub fn mailer(&self) -> Option<&Arc<dyn MailSender>> {
        self.mailer.as_ref()
    }

    pub fn mail_from(&self) -> &str {
        &self.mail_from
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn show_kml(&self) -> bool {
        self.show_kml
    }

    pub fn is_soap(&self) -> bool {
        self.soap
    }

    pub fn speed_units(&self) -> SpeedUnits {
        self.account.speed_units
    }

    pub fn distance_units(&self) -> &'static str {
        match self.account.speed_units {
            SpeedUnits::Mph => "Miles",
            SpeedUnits::Kph => "Km",
        }
    }

    /// Value of a request-level key used in header text.
    ///
    /// Explicit key values win over the built-in account and user keys.
    pub fn key_value(&self, key: &str) -> Option<String> {
        if let Some(v) = self.key_values.get(key) {
            return Some(v.clone());
        }
        let value = match key.to_ascii_lowercase().as_str() {
            "accountid" => self.account.account_id.clone(),
            "accountdesc" => self.account.description.clone(),
            "userid" => self.user.as_ref().map(|u| u.user_id.clone())?,
            "userdesc" => self.user.as_ref().map(|u| u.description.clone())?,
            "speedunits" => self.speed_units().to_string(),
            "distanceunits" => self.distance_units().to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Email address reports for this request are sent to by default.
    pub fn report_email(&self) -> &str {
        match &self.user {
            Some(user) if !user.report_email.trim().is_empty() => user.report_email.trim(),
            _ => self.account.report_email.trim(),
        }
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("account", &self.account.account_id)
            .field("user", &self.user.as_ref().map(|u| &u.user_id))
            .field("zone", &self.zone.name())
            .finish()
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
