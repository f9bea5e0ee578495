//! sheetwatch
//!
//! Scheduled batch job: load monitored links from a Google spreadsheet,
//! fingerprint each page, notify the row's Telegram recipient when the
//! fingerprint changes, and write the new fingerprint back.
//!
//! - [`config`]: flags, environment and validation
//! - [`logging`]: tracing subscriber setup
//! - [`app`]: collaborator wiring and the single run

#![warn(unreachable_pub)]

pub mod app;
pub mod config;
pub mod logging;

pub use app::{build_monitor, run};
pub use config::{Cli, OnNotifyFailure, WatchConfig};
pub use logging::LogFormat;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
