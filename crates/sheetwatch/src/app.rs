//! Wiring: build the collaborators from a [`WatchConfig`] and run one pass

use crate::config::WatchConfig;
use sheetwatch_clients::{GoogleSheetStore, HttpFetcher, ServiceAccountAuth, TelegramNotifier};
use sheetwatch_core::{ChangeMonitor, RunReport, WatchError};
use std::sync::Arc;
use std::time::Duration;

/// Bound on each store request, token exchange included
pub const STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a monitor over Google Sheets, HTTP and Telegram
///
/// No network traffic happens here.
///
/// # Errors
/// Returns `WatchError::Config` if a client cannot be configured and
/// `WatchError::StoreConnection` if the store client cannot be created.
pub fn build_monitor(config: WatchConfig) -> Result<ChangeMonitor, WatchError> {
    let auth = ServiceAccountAuth::new(config.credentials, STORE_TIMEOUT)
        .map_err(WatchError::StoreConnection)?;
    let store = GoogleSheetStore::new(
        Arc::new(auth),
        config.locator,
        config.fingerprint_column,
        STORE_TIMEOUT,
    )
    .map_err(WatchError::StoreConnection)?;
    let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout)?;
    let notifier = TelegramNotifier::with_api_base(
        config.telegram_token,
        config.notify_timeout,
        config.telegram_api,
    )?;

    Ok(ChangeMonitor::new(Arc::new(store), Arc::new(fetcher), Arc::new(notifier))
        .with_options(config.options))
}

/// Run a single pass
///
/// # Errors
/// Returns `WatchError` when the run aborts; see [`ChangeMonitor::run`].
pub async fn run(config: WatchConfig) -> Result<RunReport, WatchError> {
    tracing::info!(
        locator = ?config.locator,
        dry_run = config.options.dry_run,
        notify_failure = ?config.options.notify_failure,
        "starting sheetwatch run"
    );
    build_monitor(config)?.run().await
}
