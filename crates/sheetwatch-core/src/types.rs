//! Record model
//!
//! Rows arrive from the store as [`RawRecord`]s paired with their
//! [`RowPosition`]. Validation into a [`MonitoredLink`] happens once, before
//! any network call is made for the row.

use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One-based row number of a record in the store
///
/// Row 1 is the header, so the first data row is row 2. Write-backs address
/// this position directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowPosition(u32);

impl RowPosition {
    /// Row number of the first data record
    pub const FIRST_DATA_ROW: u32 = 2;

    /// Create from an explicit row number
    #[inline]
    #[must_use]
    pub const fn new(row: u32) -> Self {
        Self(row)
    }

    /// Position of the `index`-th data record (zero-based)
    #[inline]
    #[must_use]
    pub fn from_data_index(index: usize) -> Self {
        let index = u32::try_from(index).unwrap_or(u32::MAX - Self::FIRST_DATA_ROW);
        Self(index.saturating_add(Self::FIRST_DATA_ROW))
    }

    /// Row number
    #[inline]
    #[must_use]
    pub const fn row(self) -> u32 {
        self.0
    }
}

impl Display for RowPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// Opaque notification address (a chat id for the bot channel)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(String);

impl RecipientId {
    /// Create a recipient id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecipientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A store row as read, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Address to fetch
    pub link: Option<String>,
    /// Where to send change notifications
    pub recipient_id: Option<String>,
    /// Last recorded fingerprint
    pub content_fingerprint: Option<String>,
}

impl RawRecord {
    /// Build from cell text, treating blank cells as absent
    #[must_use]
    pub fn from_cells(link: &str, recipient_id: &str, content_fingerprint: &str) -> Self {
        Self {
            link: non_blank(link),
            recipient_id: non_blank(recipient_id),
            content_fingerprint: non_blank(content_fingerprint),
        }
    }
}

/// Trimmed-empty cells carry no value
#[must_use]
pub fn non_blank(cell: &str) -> Option<String> {
    if cell.trim().is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Required field absent from a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    /// No link to fetch
    Link,
    /// No recipient to notify
    RecipientId,
}

impl Display for MissingField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => f.write_str("link"),
            Self::RecipientId => f.write_str("recipient_id"),
        }
    }
}

/// A validated monitored link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredLink {
    /// Address to fetch
    pub link: String,
    /// Notification address
    pub recipient: RecipientId,
    /// Fingerprint from the previous observation, if any
    pub fingerprint: Option<Fingerprint>,
}

impl TryFrom<RawRecord> for MonitoredLink {
    type Error = MissingField;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let link = raw
            .link
            .filter(|l| !l.trim().is_empty())
            .ok_or(MissingField::Link)?;
        let recipient = raw
            .recipient_id
            .filter(|r| !r.trim().is_empty())
            .map(RecipientId::new)
            .ok_or(MissingField::RecipientId)?;
        let fingerprint = raw
            .content_fingerprint
            .filter(|f| !f.is_empty())
            .map(Fingerprint::from_stored);
        Ok(Self {
            link,
            recipient,
            fingerprint,
        })
    }
}

/// A value paired with the row it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positioned<T> {
    /// Store row
    pub position: RowPosition,
    /// Row content
    pub record: T,
}

impl<T> Positioned<T> {
    /// Pair a record with its row
    #[inline]
    pub fn new(position: RowPosition, record: T) -> Self {
        Self { position, record }
    }
}

/// What to do with the stored fingerprint when a change notification fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyFailurePolicy {
    /// Persist the new fingerprint anyway; the change will not be re-sent
    #[default]
    AdvanceFingerprint,
    /// Keep the old fingerprint so the next run detects and re-sends
    RetryNextRun,
}

/// Knobs for a single monitor run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Fetch and compare only; no notifications, no writes
    pub dry_run: bool,
    /// Fingerprint handling after a failed notification
    pub notify_failure: NotifyFailurePolicy,
}

impl MonitorOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With dry run
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// With notify failure policy
    #[inline]
    #[must_use]
    pub fn with_notify_failure(mut self, policy: NotifyFailurePolicy) -> Self {
        self.notify_failure = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_rows_start_after_header() {
        assert_eq!(RowPosition::from_data_index(0).row(), 2);
        assert_eq!(RowPosition::from_data_index(9).row(), 11);
        assert_eq!(RowPosition::new(7).to_string(), "row 7");
    }

    #[test]
    fn from_cells_blank_is_absent() {
        let raw = RawRecord::from_cells("https://a.test/p", "  ", "");
        assert_eq!(raw.link.as_deref(), Some("https://a.test/p"));
        assert_eq!(raw.recipient_id, None);
        assert_eq!(raw.content_fingerprint, None);
    }

    #[test]
    fn validation_requires_link_and_recipient() {
        let no_link = RawRecord::from_cells("", "123", "");
        assert_eq!(MonitoredLink::try_from(no_link), Err(MissingField::Link));

        let no_recipient = RawRecord::from_cells("https://a.test/p", "", "abc");
        assert_eq!(
            MonitoredLink::try_from(no_recipient),
            Err(MissingField::RecipientId)
        );
    }

    #[test]
    fn validation_keeps_optional_fingerprint() {
        let fresh = MonitoredLink::try_from(RawRecord::from_cells("https://a.test/p", "123", ""))
            .unwrap();
        assert_eq!(fresh.fingerprint, None);
        assert_eq!(fresh.recipient.as_str(), "123");

        let seen = MonitoredLink::try_from(RawRecord::from_cells("https://a.test/p", "123", "abc"))
            .unwrap();
        assert_eq!(seen.fingerprint, Some(Fingerprint::from_stored("abc")));
    }

    #[test]
    fn empty_fingerprint_from_direct_construction_is_absent() {
        let raw = RawRecord {
            link: Some("https://a.test/p".into()),
            recipient_id: Some("123".into()),
            content_fingerprint: Some(String::new()),
        };
        assert_eq!(MonitoredLink::try_from(raw).unwrap().fingerprint, None);
    }

    #[test]
    fn options_builder() {
        let opts = MonitorOptions::new()
            .with_dry_run(true)
            .with_notify_failure(NotifyFailurePolicy::RetryNextRun);
        assert!(opts.dry_run);
        assert_eq!(opts.notify_failure, NotifyFailurePolicy::RetryNextRun);
        assert_eq!(
            MonitorOptions::default().notify_failure,
            NotifyFailurePolicy::AdvanceFingerprint
        );
    }
}
