//! sheetwatch core - change monitoring for spreadsheet-listed links
//!
//! One run:
//! - Loads monitored links from a [`RecordStore`]
//! - Fetches each link through a [`Fetcher`] and fingerprints the body
//! - Stores a baseline on first sight, or notifies through a [`Notifier`]
//!   and stores the new fingerprint when content changed
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetwatch_core::{ChangeMonitor, MonitorOptions};
//!
//! # async fn example(store, fetcher, notifier) -> Result<(), Box<dyn std::error::Error>> {
//! let monitor = ChangeMonitor::new(store, fetcher, notifier)
//!     .with_options(MonitorOptions::new().with_dry_run(true));
//! let report = monitor.run().await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod fetch;
pub mod fingerprint;
pub mod monitor;
pub mod notify;
pub mod store;
pub mod types;

pub use error::{ConfigError, FetchError, NotifyError, StoreError, WatchError};
pub use fetch::Fetcher;
pub use fingerprint::Fingerprint;
pub use monitor::{Change, ChangeMonitor, RecordOutcome, RecordReport, RunReport, RunSummary};
pub use notify::{ChangeNotice, Notifier};
pub use store::RecordStore;
pub use types::{
    MissingField, MonitorOptions, MonitoredLink, NotifyFailurePolicy, Positioned, RawRecord,
    RecipientId, RowPosition,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring a monitor
    pub use crate::{
        ChangeMonitor, ChangeNotice, Fetcher, Fingerprint, MonitorOptions, Notifier, RecordStore,
        RunReport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
