//! Google Sheets as the record store
//!
//! - [`credentials`]: service-account key parsing
//! - [`auth`]: bearer tokens via the JWT-bearer grant
//! - [`store`]: the [`RecordStore`](sheetwatch_core::RecordStore) implementation
//! - [`a1`]: A1 range notation

pub mod a1;
pub mod auth;
pub mod credentials;
pub mod store;

pub use auth::{AccessTokenSource, ServiceAccountAuth, StaticToken, SHEETS_SCOPES};
pub use credentials::ServiceAccountKey;
pub use store::{
    ColumnLayout, GoogleSheetStore, SheetLocator, SheetsEndpoints, DEFAULT_FINGERPRINT_COLUMN,
};
