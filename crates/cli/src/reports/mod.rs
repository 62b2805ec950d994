// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in report kinds and the layouts they render through.

pub mod event_count;
pub mod event_detail;
pub mod event_layout;
pub mod event_summary;
pub mod field_layout;

pub use event_count::EventCountReport;
pub use event_detail::EventDetailReport;
pub use event_summary::EventSummaryReport;
