// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet records and the store traits reports read them through.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraints::LimitType;
use crate::error::Result;

/// Group id meaning "every device in the account".
pub const DEVICE_GROUP_ALL: &str = "all";

/// Description shown for the implicit all-devices group.
pub const DEVICE_GROUP_ALL_DESC: &str = "All";

pub const KILOMETERS_PER_MILE: f64 = 1.609344;

/// Units speeds are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnits {
    #[default]
    Mph,
    Kph,
}

impl SpeedUnits {
    pub fn from_kph(&self, kph: f64) -> f64 {
        match self {
            SpeedUnits::Mph => kph / KILOMETERS_PER_MILE,
            SpeedUnits::Kph => kph,
        }
    }
}

impl fmt::Display for SpeedUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedUnits::Mph => f.write_str("mph"),
            SpeedUnits::Kph => f.write_str("km/h"),
        }
    }
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub report_email: String,
    #[serde(default)]
    pub speed_units: SpeedUnits,
}

impl Account {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            description: String::new(),
            time_zone: default_time_zone(),
            report_email: String::new(),
            speed_units: SpeedUnits::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub account_id: String,
    pub user_id: String,
    #[serde(default)]
    pub description: String,
    /// Devices this user may see; absent means every device in the account.
    #[serde(default)]
    pub authorized_devices: Option<BTreeSet<String>>,
    #[serde(default)]
    pub report_email: String,
}

impl User {
    pub fn new(account_id: &str, user_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            user_id: user_id.to_string(),
            description: String::new(),
            authorized_devices: None,
            report_email: String::new(),
        }
    }

    pub fn with_authorized<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorized_devices = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_authorized_device(&self, device_id: &str) -> bool {
        match &self.authorized_devices {
            Some(ids) => ids.contains(device_id),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub account_id: String,
    pub device_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vehicle_id: String,
}

impl Device {
    pub fn new(account_id: &str, device_id: &str, description: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            device_id: device_id.to_string(),
            description: description.to_string(),
            vehicle_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroup {
    pub account_id: String,
    pub group_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub device_ids: Vec<String>,
}

/// One recorded GPS event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub account_id: String,
    pub device_id: String,
    pub timestamp: i64,
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default, rename = "speedKPH")]
    pub speed_kph: f64,
    #[serde(default)]
    pub heading: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default, rename = "odometerKM")]
    pub odometer_km: f64,
}

impl EventRecord {
    pub fn new(account_id: &str, device_id: &str, timestamp: i64, status_code: i32) -> Self {
        Self {
            account_id: account_id.to_string(),
            device_id: device_id.to_string(),
            timestamp,
            status_code,
            latitude: 0.0,
            longitude: 0.0,
            speed_kph: 0.0,
            heading: 0.0,
            address: String::new(),
            odometer_km: 0.0,
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    pub fn with_speed(mut self, speed_kph: f64) -> Self {
        self.speed_kph = speed_kph;
        self
    }

    /// A fix is valid when it is inside range and not the 0/0 placeholder.
    pub fn is_valid_gps(&self) -> bool {
        let in_range = self.latitude.abs() <= 90.0 && self.longitude.abs() <= 180.0;
        let placeholder = self.latitude == 0.0 && self.longitude == 0.0;
        in_range && !placeholder
    }
}

pub const STATUS_NONE: i32 = 0xF000;
pub const STATUS_LOCATION: i32 = 0xF020;
pub const STATUS_MOTION_START: i32 = 0xF111;
pub const STATUS_MOTION_IN_MOTION: i32 = 0xF112;
pub const STATUS_MOTION_STOP: i32 = 0xF113;
pub const STATUS_MOTION_DORMANT: i32 = 0xF114;
pub const STATUS_IGNITION_ON: i32 = 0xF401;
pub const STATUS_IGNITION_OFF: i32 = 0xF403;

/// Human-readable name of a status code.
pub fn status_description(code: i32) -> String {
    let name = match code {
        STATUS_NONE => "None",
        STATUS_LOCATION => "Location",
        STATUS_MOTION_START => "Start",
        STATUS_MOTION_IN_MOTION => "InMotion",
        STATUS_MOTION_STOP => "Stop",
        STATUS_MOTION_DORMANT => "Dormant",
        STATUS_IGNITION_ON => "Ignition On",
        STATUS_IGNITION_OFF => "Ignition Off",
        _ => return format!("0x{:04X}", code),
    };
    name.to_string()
}

/// Selection parameters passed to an event store.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub account_id: String,
    pub device_id: String,
    pub time_start: i64,
    pub time_end: i64,
    pub status_codes: Option<Vec<i32>>,
    pub valid_gps: bool,
    pub limit_type: LimitType,
    pub limit: i64,
    pub ascending: bool,
    pub where_clause: String,
}

impl EventQuery {
    /// Every event of one device, oldest first.
    pub fn new(account_id: &str, device_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            device_id: device_id.to_string(),
            time_start: -1,
            time_end: -1,
            status_codes: None,
            valid_gps: false,
            limit_type: LimitType::First,
            limit: -1,
            ascending: true,
            where_clause: String::new(),
        }
    }
}

/// What the store does with a record after the handler sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Save,
    Skip,
    Stop,
}

pub trait DeviceStore {
    fn account(&self, account_id: &str) -> Result<Option<Account>>;
    fn user(&self, account_id: &str, user_id: &str) -> Result<Option<User>>;
    fn device(&self, account_id: &str, device_id: &str) -> Result<Option<Device>>;
    fn group(&self, account_id: &str, group_id: &str) -> Result<Option<DeviceGroup>>;
    fn group_device_ids(&self, account_id: &str, group_id: &str) -> Result<Vec<String>>;

    /// Every device the user (or, without a user, the account) may see.
    fn authorized_device_ids(&self, account: &Account, user: Option<&User>) -> Result<Vec<String>>;
}

pub trait EventStore {
    /// Select events, passing each to `handler` in output order.
    fn range_events(
        &self,
        query: &EventQuery,
        handler: &mut dyn FnMut(&EventRecord) -> RecordAction,
    ) -> Result<Vec<EventRecord>>;

    fn count_events(&self, query: &EventQuery) -> Result<u64>;
}

/// Both halves of the fleet data a report reads.
pub trait FleetStore: DeviceStore + EventStore + Send + Sync {}

impl<T: DeviceStore + EventStore + Send + Sync> FleetStore for T {}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
