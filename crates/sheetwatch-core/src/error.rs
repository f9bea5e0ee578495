//! Error types for sheetwatch
//!
//! Only two kinds abort a run:
//! - Configuration errors, raised before any external contact
//! - Store connection errors, raised while loading records
//!
//! Fetch, notification and per-record store failures are isolated to the
//! record they occurred on and surface through
//! [`RecordOutcome`](crate::monitor::RecordOutcome) instead.

/// Run-level error; every variant is fatal
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Required configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The record store could not be opened or read
    #[error("store connection failed: {0}")]
    StoreConnection(#[source] StoreError),
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required setting has no value
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A setting has a value that cannot be used
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Setting name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Credentials were rejected or could not be used
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The named store or worksheet does not exist
    #[error("store not found: {0}")]
    NotFound(String),

    /// Transport or HTTP status failure
    #[error("store request failed{}: {message}", status_suffix(.status))]
    Http {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Failure detail
        message: String,
    },

    /// The store answered with data that could not be interpreted
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Resource fetch errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Connection, TLS, redirect or body decoding failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not finish within the fetch timeout
    #[error("timed out")]
    Timeout,

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),
}

/// Notification send errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// The request could not be delivered to the channel
    #[error("transport error: {0}")]
    Transport(String),

    /// The send did not finish within the notify timeout
    #[error("timed out")]
    Timeout,

    /// The channel refused the message
    #[error("rejected{}: {description}", status_suffix(.status))]
    Rejected {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Channel-supplied reason
        description: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_error_display() {
        let err = WatchError::from(ConfigError::Missing("TELEGRAM_TOKEN"));
        assert_eq!(
            err.to_string(),
            "configuration error: missing required setting: TELEGRAM_TOKEN"
        );

        let err = WatchError::StoreConnection(StoreError::NotFound("Links".into()));
        assert_eq!(
            err.to_string(),
            "store connection failed: store not found: Links"
        );
    }

    #[test]
    fn http_status_is_optional_in_display() {
        let with = StoreError::Http {
            status: Some(403),
            message: "forbidden".into(),
        };
        assert_eq!(with.to_string(), "store request failed (HTTP 403): forbidden");

        let without = StoreError::Http {
            status: None,
            message: "connection reset".into(),
        };
        assert_eq!(without.to_string(), "store request failed: connection reset");
    }

    #[test]
    fn notify_rejected_display() {
        let err = NotifyError::Rejected {
            status: Some(400),
            description: "Bad Request: chat not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "rejected (HTTP 400): Bad Request: chat not found"
        );
    }

    #[test]
    fn fetch_error_display() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP status 404");
        assert_eq!(FetchError::Timeout.to_string(), "timed out");
    }
}
