pub mod callback;
pub mod cli;
pub mod color;
pub mod column;
pub mod config;
pub mod constraints;
pub mod data;
pub mod devices;
pub mod discovery;
pub mod error;
pub mod factory;
pub mod filter;
pub mod keys;
pub mod layout;
pub mod mail;
pub mod model;
pub mod presentation;
pub mod reports;
pub mod request;
pub mod session;
pub mod spreadsheet;
pub mod store;
pub mod template;
pub mod timefmt;

pub use callback::ReportCallback;
pub use cli::{Cli, Command, ListArgs, RenderArgs};
pub use config::Config;
pub use constraints::{LimitType, ReportConstraints};
pub use data::{ReportData, ReportKind};
pub use devices::ReportDeviceList;
pub use error::{Error, ExitCode, Result};
pub use factory::{LoadOptions, ReportEntry, ReportFactory, ReportRegistry};
pub use presentation::ReportFormat;
pub use request::RequestContext;
pub use session::{DeviceSelection, RenderRequest, Session};
pub use store::MemoryStore;

#[cfg(test)]
pub mod test_utils;
