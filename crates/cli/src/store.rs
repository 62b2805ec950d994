// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fleet data loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constraints::LimitType;
use crate::error::{Error, Result};
use crate::filter::Predicate;
use crate::model::{
    Account, DEVICE_GROUP_ALL, Device, DeviceGroup, DeviceStore, EventQuery, EventRecord,
    EventStore, RecordAction, User,
};

/// Serialized form of a fleet data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FleetData {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub groups: Vec<DeviceGroup>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// Store backed by a [`FleetData`] value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: FleetData,
}

impl MemoryStore {
    pub fn new(data: FleetData) -> Self {
        Self { data }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
            .map_err(|e| Error::Store(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let data: FleetData =
            serde_json::from_str(content).map_err(|e| Error::Store(e.to_string()))?;
        Ok(Self::new(data))
    }

    pub fn data(&self) -> &FleetData {
        &self.data
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.data.accounts.push(account);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.data.users.push(user);
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.data.devices.push(device);
        self
    }

    pub fn with_group(mut self, group: DeviceGroup) -> Self {
        self.data.groups.push(group);
        self
    }

    pub fn with_events<I: IntoIterator<Item = EventRecord>>(mut self, events: I) -> Self {
        self.data.events.extend(events);
        self
    }

    fn select(&self, query: &EventQuery) -> Result<Vec<&EventRecord>> {
        let predicate = if query.where_clause.trim().is_empty() {
            None
        } else {
            Some(
                Predicate::parse(&query.where_clause)
                    .map_err(|e| Error::Store(e.to_string()))?,
            )
        };

        let mut selected: Vec<&EventRecord> = self
            .data
            .events
            .iter()
            .filter(|ev| ev.account_id == query.account_id && ev.device_id == query.device_id)
            .filter(|ev| query.time_start <= 0 || ev.timestamp >= query.time_start)
            .filter(|ev| query.time_end <= 0 || ev.timestamp <= query.time_end)
            .filter(|ev| match &query.status_codes {
                Some(codes) => codes.contains(&ev.status_code),
                None => true,
            })
            .filter(|ev| !query.valid_gps || ev.is_valid_gps())
            .filter(|ev| predicate.as_ref().is_none_or(|p| p.matches(ev)))
            .collect();
        selected.sort_by_key(|ev| ev.timestamp);

        if query.limit > 0 {
            let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
            if selected.len() > limit {
                match query.limit_type {
                    LimitType::First => selected.truncate(limit),
                    LimitType::Last => {
                        selected.drain(..selected.len() - limit);
                    }
                }
            }
        }
        if !query.ascending {
            selected.reverse();
        }
        Ok(selected)
    }
}

impl DeviceStore for MemoryStore {
    fn account(&self, account_id: &str) -> Result<Option<Account>> {
        Ok(self
            .data
            .accounts
            .iter()
            .find(|a| a.account_id == account_id)
            .cloned())
    }

    fn user(&self, account_id: &str, user_id: &str) -> Result<Option<User>> {
        Ok(self
            .data
            .users
            .iter()
            .find(|u| u.account_id == account_id && u.user_id == user_id)
            .cloned())
    }

    fn device(&self, account_id: &str, device_id: &str) -> Result<Option<Device>> {
        Ok(self
            .data
            .devices
            .iter()
            .find(|d| d.account_id == account_id && d.device_id == device_id)
            .cloned())
    }

    fn group(&self, account_id: &str, group_id: &str) -> Result<Option<DeviceGroup>> {
        Ok(self
            .data
            .groups
            .iter()
            .find(|g| g.account_id == account_id && g.group_id == group_id)
            .cloned())
    }

    fn group_device_ids(&self, account_id: &str, group_id: &str) -> Result<Vec<String>> {
        if group_id.eq_ignore_ascii_case(DEVICE_GROUP_ALL) {
            let mut ids: Vec<String> = self
                .data
                .devices
                .iter()
                .filter(|d| d.account_id == account_id)
                .map(|d| d.device_id.clone())
                .collect();
            ids.sort();
            return Ok(ids);
        }
        match self.group(account_id, group_id)? {
            Some(group) => Ok(group.device_ids),
            None => Err(Error::NotFound(format!(
                "Device group not found: {}/{}",
                account_id, group_id
            ))),
        }
    }

    fn authorized_device_ids(&self, account: &Account, user: Option<&User>) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .data
            .devices
            .iter()
            .filter(|d| d.account_id == account.account_id)
            .filter(|d| user.is_none_or(|u| u.is_authorized_device(&d.device_id)))
            .map(|d| d.device_id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl EventStore for MemoryStore {
    fn range_events(
        &self,
        query: &EventQuery,
        handler: &mut dyn FnMut(&EventRecord) -> RecordAction,
    ) -> Result<Vec<EventRecord>> {
        let mut saved = Vec::new();
        for ev in self.select(query)? {
            match handler(ev) {
                RecordAction::Save => saved.push(ev.clone()),
                RecordAction::Skip => {}
                RecordAction::Stop => break,
            }
        }
        Ok(saved)
    }

    fn count_events(&self, query: &EventQuery) -> Result<u64> {
        Ok(self.select(query)?.len() as u64)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
