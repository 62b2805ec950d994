// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Everything a command needs: config, report registry and fleet data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{self, Config, SUPPORTED_VERSION};
use crate::data::ReportData;
use crate::devices::ReportDeviceList;
use crate::discovery;
use crate::error::{Error, Result};
use crate::factory::{LoadOptions, ReportEntry, ReportFactory, ReportRegistry, global_registry};
use crate::filter;
use crate::mail::FileMailSender;
use crate::model::{DeviceStore, FleetStore};
use crate::request::RequestContext;
use crate::store::MemoryStore;

/// Which devices a rendered report covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeviceSelection {
    /// Every device the user may see.
    #[default]
    Authorized,
    Group(String),
    Devices(Vec<String>),
}

/// What to render and for whom.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub report: String,
    pub account: String,
    pub user: Option<String>,
    pub devices: DeviceSelection,
    pub option: Option<String>,
    pub time_start: Option<i64>,
    pub time_end: Option<i64>,
    pub limit: Option<i64>,
}

pub struct Session {
    config: Config,
    base: Option<PathBuf>,
    definition: PathBuf,
    registry: Arc<ReportRegistry>,
}

impl Session {
    /// Load config (explicit or discovered from `cwd`) and the definition it names.
    ///
    /// Without a config file, defaults apply relative to `cwd`.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let (config, base) = match discovery::resolve_config(explicit, cwd)? {
            Some(path) => {
                tracing::debug!("using config {}", path.display());
                let base = path.parent().map(Path::to_path_buf);
                (config::load_with_warnings(&path)?, base)
            }
            None => {
                let config = Config {
                    version: SUPPORTED_VERSION,
                    ..Config::default()
                };
                (config, Some(cwd.to_path_buf()))
            }
        };
        Ok(Self::with_config(config, base))
    }

    pub fn with_config(config: Config, base: Option<PathBuf>) -> Self {
        let options = LoadOptions::from_config(&config, base.as_deref());
        let definition = config.resolve_path(base.as_deref(), &config.reports.definition);
        let registry = global_registry().reload(&definition, &options);
        Self {
            config,
            base,
            definition,
            registry,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn definition(&self) -> &Path {
        &self.definition
    }

    pub fn registry(&self) -> &Arc<ReportRegistry> {
        &self.registry
    }

    pub fn report_factory(&self, name: &str) -> Result<Arc<ReportFactory>> {
        self.registry
            .report_factory(name, false)?
            .ok_or_else(|| Error::NotFound(format!("Report name not found: {}", name)))
    }

    pub fn open_store(&self) -> Result<Arc<dyn FleetStore>> {
        let path = self.config.resolve_path(self.base.as_deref(), &self.config.data.store);
        Ok(Arc::new(MemoryStore::load(&path)?))
    }

    /// Request context for `account`, optionally as `user`.
    pub fn request(
        &self,
        store: Arc<dyn FleetStore>,
        account: &str,
        user: Option<&str>,
    ) -> Result<RequestContext> {
        let account = store
            .account(account)?
            .ok_or_else(|| Error::NotFound(format!("Account not found: {}", account)))?;
        let user = match user {
            Some(id) => Some(store.user(&account.account_id, id)?.ok_or_else(|| {
                Error::NotFound(format!("User not found: {}/{}", account.account_id, id))
            })?),
            None => None,
        };

        let reports = &self.config.reports;
        let mut request = RequestContext::new(store, account)
            .with_user(user)
            .with_rule_engine(filter::rule_engine_for(&reports.rule_engine))
            .with_base_url(&reports.base_url)
            .with_show_kml(reports.show_kml);
        if let Some(outbox) = &self.config.mail.outbox {
            let outbox = self.config.resolve_path(self.base.as_deref(), outbox);
            request = request.with_mailer(
                Arc::new(FileMailSender::new(&outbox)),
                &self.config.mail.from,
            );
        }
        Ok(request)
    }

    /// Instantiate the requested report with its time range and limits applied.
    pub fn create_report(&self, request: &RequestContext, wanted: &RenderRequest) -> Result<ReportData> {
        let factory = self.report_factory(&wanted.report)?;
        let entry = ReportEntry::new(Arc::clone(&factory), "");
        let option = wanted.option.as_deref();

        let mut report = match &wanted.devices {
            DeviceSelection::Group(group_id) => {
                let group = request
                    .store()
                    .group(&request.account().account_id, group_id)?
                    .ok_or_else(|| Error::NotFound(format!("Device group not found: {}", group_id)))?;
                factory.create_report_for_group(Some(&entry), option, request, Some(group))?
            }
            DeviceSelection::Devices(ids) => {
                factory.create_report_for_ids(Some(&entry), option, request, ids.as_slice())?
            }
            DeviceSelection::Authorized => {
                let mut devices = ReportDeviceList::new(
                    Arc::clone(request.store()),
                    request.account().clone(),
                    request.user().cloned(),
                );
                devices.add_all_authorized();
                factory.create_report(Some(&entry), option, request, devices)?
            }
        };

        let constraints = report.constraints_mut();
        if let Some(ts) = wanted.time_start {
            constraints.set_time_start(ts);
        }
        if let Some(te) = wanted.time_end {
            constraints.set_time_end(te);
        }
        if let Some(limit) = wanted.limit {
            constraints.set_selection_limit(limit);
            constraints.set_report_limit(limit);
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
