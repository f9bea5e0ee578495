//! Network collaborators for sheetwatch
//!
//! Concrete implementations of the core traits:
//!
//! - [`HttpFetcher`]: downloads monitored pages
//! - [`TelegramNotifier`]: sends change notices through a Telegram bot
//! - [`GoogleSheetStore`]: reads records from and writes fingerprints to a
//!   Google spreadsheet

#![warn(unreachable_pub)]

pub mod http;
pub mod sheets;
pub mod telegram;

pub use http::{HttpFetcher, DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT};
pub use sheets::{
    AccessTokenSource, GoogleSheetStore, ServiceAccountAuth, ServiceAccountKey, SheetLocator,
    SheetsEndpoints, StaticToken, DEFAULT_FINGERPRINT_COLUMN,
};
pub use telegram::{TelegramNotifier, DEFAULT_NOTIFY_TIMEOUT, DEFAULT_TELEGRAM_API};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
