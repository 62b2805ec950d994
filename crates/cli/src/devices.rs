// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The set of devices a report runs over.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::model::{Account, Device, DeviceGroup, DeviceStore, FleetStore, User};

#[derive(Debug, Clone)]
enum HolderState {
    Unresolved,
    Resolved(Device),
    /// Lookup found nothing; later calls skip the store.
    Missing,
}

/// A device id whose record is fetched on first use.
#[derive(Clone)]
pub struct DeviceHolder {
    store: Arc<dyn FleetStore>,
    account_id: String,
    device_id: String,
    state: RefCell<HolderState>,
    description: RefCell<Option<String>>,
}

impl DeviceHolder {
    fn new(store: Arc<dyn FleetStore>, account_id: &str, device_id: &str) -> Self {
        Self {
            store,
            account_id: account_id.to_string(),
            device_id: device_id.to_string(),
            state: RefCell::new(HolderState::Unresolved),
            description: RefCell::new(None),
        }
    }

    fn resolved(store: Arc<dyn FleetStore>, device: Device) -> Self {
        let holder = Self::new(store, &device.account_id, &device.device_id);
        *holder.state.borrow_mut() = HolderState::Resolved(device);
        holder
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn has_device(&self) -> bool {
        matches!(*self.state.borrow(), HolderState::Resolved(_))
    }

    /// Attach a record, ignored unless it matches this holder's ids.
    fn set_device(&self, device: Device) {
        if device.account_id == self.account_id && device.device_id == self.device_id {
            *self.state.borrow_mut() = HolderState::Resolved(device);
        }
    }

    /// The device record, loading it if needed.
    pub fn device(&self) -> Result<Option<Device>> {
        let current = self.state.borrow().clone();
        match current {
            HolderState::Resolved(device) => Ok(Some(device)),
            HolderState::Missing => Ok(None),
            HolderState::Unresolved => {
                let found = self.store.device(&self.account_id, &self.device_id)?;
                *self.state.borrow_mut() = match &found {
                    Some(device) => HolderState::Resolved(device.clone()),
                    None => HolderState::Missing,
                };
                Ok(found)
            }
        }
    }

    /// Device description, empty when the record can't be loaded.
    pub fn description(&self) -> String {
        if let Some(desc) = self.description.borrow().as_ref() {
            return desc.clone();
        }
        let desc = match self.device() {
            Ok(Some(device)) => device.description,
            Ok(None) | Err(_) => String::new(),
        };
        *self.description.borrow_mut() = Some(desc.clone());
        desc
    }
}

impl fmt::Debug for DeviceHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHolder")
            .field("account_id", &self.account_id)
            .field("device_id", &self.device_id)
            .field("state", &self.state)
            .finish()
    }
}

/// Authorized devices for one report request, keyed by device id.
#[derive(Clone)]
pub struct ReportDeviceList {
    store: Arc<dyn FleetStore>,
    account: Account,
    user: Option<User>,
    group: Option<DeviceGroup>,
    is_group: bool,
    devices: BTreeMap<String, DeviceHolder>,
}

impl ReportDeviceList {
    pub fn new(store: Arc<dyn FleetStore>, account: Account, user: Option<User>) -> Self {
        Self {
            store,
            account,
            user,
            group: None,
            is_group: false,
            devices: BTreeMap::new(),
        }
    }

    pub fn for_device(
        store: Arc<dyn FleetStore>,
        account: Account,
        user: Option<User>,
        device: Device,
    ) -> Self {
        let mut list = Self::new(store, account, user);
        list.add_device(device);
        list
    }

    pub fn for_ids<S: AsRef<str>>(
        store: Arc<dyn FleetStore>,
        account: Account,
        user: Option<User>,
        ids: &[S],
    ) -> Self {
        let mut list = Self::new(store, account, user);
        list.add_ids(ids);
        list
    }

    pub fn for_group(
        store: Arc<dyn FleetStore>,
        account: Account,
        user: Option<User>,
        group: DeviceGroup,
    ) -> Self {
        let mut list = Self::new(store, account, user);
        list.add_group(&group);
        list.group = Some(group);
        list.is_group = true;
        list
    }

    pub fn store(&self) -> &Arc<dyn FleetStore> {
        &self.store
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_id(&self) -> &str {
        &self.account.account_id
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.user_id.as_str())
    }

    pub fn group(&self) -> Option<&DeviceGroup> {
        self.group.as_ref()
    }

    pub fn group_id(&self) -> &str {
        self.group.as_ref().map_or("", |g| g.group_id.as_str())
    }

    pub fn is_device_group(&self) -> bool {
        self.is_group || self.len() > 1
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn clear(&mut self) {
        self.devices.clear();
    }

    fn authorized(&self, device_id: &str) -> bool {
        self.user
            .as_ref()
            .is_none_or(|u| u.is_authorized_device(device_id))
    }

    fn insert_id(&mut self, device_id: &str) {
        if !self.authorized(device_id) || self.devices.contains_key(device_id) {
            return;
        }
        let holder = DeviceHolder::new(Arc::clone(&self.store), self.account_id(), device_id);
        self.devices.insert(device_id.to_string(), holder);
    }

    /// Replace the contents with a single device id.
    pub fn set_device(&mut self, device_id: &str) -> bool {
        self.clear();
        self.add_id(device_id)
    }

    pub fn add_device(&mut self, device: Device) -> bool {
        if !self.authorized(&device.device_id) {
            return true;
        }
        match self.devices.get(&device.device_id) {
            Some(holder) => holder.set_device(device),
            None => {
                let id = device.device_id.clone();
                let holder = DeviceHolder::resolved(Arc::clone(&self.store), device);
                self.devices.insert(id, holder);
            }
        }
        true
    }

    pub fn add_id(&mut self, device_id: &str) -> bool {
        if device_id.trim().is_empty() {
            return false;
        }
        self.insert_id(device_id);
        true
    }

    pub fn add_ids<S: AsRef<str>>(&mut self, ids: &[S]) -> bool {
        if ids.is_empty() {
            return false;
        }
        for id in ids {
            self.insert_id(id.as_ref());
        }
        true
    }

    /// Add every device in `group`. Fails if the group belongs to another account.
    pub fn add_group(&mut self, group: &DeviceGroup) -> bool {
        if group.account_id != self.account.account_id {
            return false;
        }
        match self
            .store
            .group_device_ids(&group.account_id, &group.group_id)
        {
            Ok(ids) => {
                for id in &ids {
                    self.insert_id(id);
                }
                self.is_group = true;
                true
            }
            Err(e) => {
                tracing::error!("Unable to add DeviceGroup: {}", e);
                false
            }
        }
    }

    pub fn add_all_authorized(&mut self) {
        match self
            .store
            .authorized_device_ids(&self.account, self.user.as_ref())
        {
            Ok(ids) => {
                self.add_ids(&ids);
            }
            Err(e) => tracing::error!("Unable to add all User devices: {}", e),
        }
    }

    /// Device ids in map order.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn holder(&self, device_id: &str) -> Option<&DeviceHolder> {
        self.devices.get(device_id)
    }

    pub fn device(&self, device_id: &str) -> Result<Option<Device>> {
        if device_id.trim().is_empty() {
            return Ok(None);
        }
        match self.devices.get(device_id) {
            Some(holder) => holder.device(),
            None => Ok(None),
        }
    }

    /// Holders in id order, or by case-insensitive description when `sort` is set.
    pub fn holders(&self, sort: bool) -> Vec<&DeviceHolder> {
        let mut holders: Vec<&DeviceHolder> = self.devices.values().collect();
        if sort {
            holders.sort_by_cached_key(|h| h.description().to_lowercase());
        }
        holders
    }

    pub fn first_device_id(&self) -> &str {
        self.devices.keys().next().map_or("", String::as_str)
    }

    pub fn first_device(&self) -> Option<Device> {
        self.device(self.first_device_id()).ok().flatten()
    }
}

impl fmt::Display for ReportDeviceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReportDeviceList: Account={} User={} Group={} Size={}",
            self.account_id(),
            self.user_id(),
            self.group_id(),
            self.len()
        )
    }
}

#[cfg(test)]
#[path = "devices_tests.rs"]
mod tests;
