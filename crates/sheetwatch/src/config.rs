//! Command line and environment configuration
//!
//! Every option can come from a flag or from the environment. [`Cli`] is the
//! raw parse; [`WatchConfig::from_cli`] validates it once, up front, so a bad
//! setting fails the run before anything is contacted.

use crate::logging::LogFormat;
use clap::{Parser, ValueEnum};
use secrecy::SecretString;
use sheetwatch_clients::{
    ServiceAccountKey, SheetLocator, DEFAULT_FINGERPRINT_COLUMN, DEFAULT_TELEGRAM_API,
    DEFAULT_USER_AGENT,
};
use sheetwatch_core::{ConfigError, MonitorOptions, NotifyFailurePolicy};
use std::path::PathBuf;
use std::time::Duration;

/// Spreadsheet looked up when no name or id is given
pub const DEFAULT_SHEET_NAME: &str = "Telegram Bot Links";

/// What to do with the stored fingerprint when a notice cannot be sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OnNotifyFailure {
    /// Store the new fingerprint anyway; the notice is lost
    #[default]
    Advance,
    /// Keep the old fingerprint so the next run notifies again
    Retry,
}

impl From<OnNotifyFailure> for NotifyFailurePolicy {
    fn from(value: OnNotifyFailure) -> Self {
        match value {
            OnNotifyFailure::Advance => Self::AdvanceFingerprint,
            OnNotifyFailure::Retry => Self::RetryNextRun,
        }
    }
}

/// sheetwatch: notify recipients when spreadsheet-listed pages change
#[derive(Parser, Debug)]
#[command(name = "sheetwatch", version, about, long_about = None)]
pub struct Cli {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Service-account credential document, inline JSON
    #[arg(long, env = "GCP_CREDS_JSON", hide_env_values = true)]
    pub credentials_json: Option<String>,

    /// Path to the service-account credential document
    #[arg(long, env = "GCP_CREDS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Title of the spreadsheet holding the links
    #[arg(long, env = "SHEET_NAME", default_value = DEFAULT_SHEET_NAME)]
    pub sheet_name: String,

    /// Spreadsheet id; skips the lookup by name
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Page request timeout in seconds
    #[arg(long, env = "SHEETWATCH_FETCH_TIMEOUT_SECS", default_value_t = 15)]
    pub fetch_timeout_secs: u64,

    /// Notification send timeout in seconds
    #[arg(long, env = "SHEETWATCH_NOTIFY_TIMEOUT_SECS", default_value_t = 15)]
    pub notify_timeout_secs: u64,

    /// User-Agent header for page requests
    #[arg(long, env = "SHEETWATCH_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// One-based column for fingerprints when the header names none
    #[arg(
        long,
        env = "SHEETWATCH_FINGERPRINT_COLUMN",
        default_value_t = DEFAULT_FINGERPRINT_COLUMN
    )]
    pub fingerprint_column: u32,

    /// Telegram Bot API host
    #[arg(long, env = "TELEGRAM_API", default_value = DEFAULT_TELEGRAM_API)]
    pub telegram_api: String,

    /// Fingerprint handling when a change notice fails
    #[arg(
        long,
        value_enum,
        env = "SHEETWATCH_ON_NOTIFY_FAILURE",
        default_value_t = OnNotifyFailure::Advance
    )]
    pub on_notify_failure: OnNotifyFailure,

    /// Fetch and compare only; send nothing and write nothing
    #[arg(long, env = "SHEETWATCH_DRY_RUN", default_value_t = false)]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, value_enum, env = "SHEETWATCH_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Validated run configuration
#[derive(Debug)]
pub struct WatchConfig {
    /// Bot token
    pub telegram_token: SecretString,
    /// Bot API host
    pub telegram_api: String,
    /// Store credentials
    pub credentials: ServiceAccountKey,
    /// Which spreadsheet to open
    pub locator: SheetLocator,
    /// Page request timeout
    pub fetch_timeout: Duration,
    /// Notification send timeout
    pub notify_timeout: Duration,
    /// User-Agent for page requests
    pub user_agent: String,
    /// Fallback fingerprint column (one-based)
    pub fingerprint_column: u32,
    /// Monitor behaviour
    pub options: MonitorOptions,
}

impl WatchConfig {
    /// Validate parsed arguments
    ///
    /// Inline credentials win over a credential file when both are set.
    ///
    /// # Errors
    /// Returns `ConfigError` for a missing token or credentials, an
    /// unreadable credential document, or an out-of-range value.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let telegram_token = cli
            .telegram_token
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;

        let credentials = match (cli.credentials_json, cli.credentials_file) {
            (Some(json), _) if !json.trim().is_empty() => ServiceAccountKey::from_json(&json)?,
            (_, Some(path)) => ServiceAccountKey::from_file(&path)?,
            _ => return Err(ConfigError::Missing("GCP_CREDS_JSON or GCP_CREDS_FILE")),
        };

        let locator = match cli.spreadsheet_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => SheetLocator::Id(id.trim().to_string()),
            None if !cli.sheet_name.trim().is_empty() => SheetLocator::Name(cli.sheet_name),
            None => {
                return Err(ConfigError::Invalid {
                    field: "SHEET_NAME",
                    reason: "must not be empty".to_string(),
                })
            }
        };

        if cli.fingerprint_column == 0 {
            return Err(ConfigError::Invalid {
                field: "fingerprint_column",
                reason: "columns are numbered from 1".to_string(),
            });
        }

        Ok(Self {
            telegram_token,
            telegram_api: cli.telegram_api,
            credentials,
            locator,
            fetch_timeout: timeout("fetch_timeout_secs", cli.fetch_timeout_secs)?,
            notify_timeout: timeout("notify_timeout_secs", cli.notify_timeout_secs)?,
            user_agent: cli.user_agent,
            fingerprint_column: cli.fingerprint_column,
            options: MonitorOptions::new()
                .with_dry_run(cli.dry_run)
                .with_notify_failure(cli.on_notify_failure.into()),
        })
    }
}

fn timeout(field: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be at least one second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
