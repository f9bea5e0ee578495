//! Change monitor
//!
//! Drives one run over the store:
//! - Loads every record once, in stored order
//! - Fetches and fingerprints each valid record
//! - Records a baseline, sends a change notice, or does nothing
//!
//! Each record yields a [`RecordOutcome`]. Failures stay inside the outcome
//! of the record they belong to; only the initial load can abort the run.

use crate::error::{FetchError, NotifyError, StoreError, WatchError};
use crate::fetch::Fetcher;
use crate::fingerprint::Fingerprint;
use crate::notify::{ChangeNotice, Notifier};
use crate::store::RecordStore;
use crate::types::{
    MissingField, MonitorOptions, MonitoredLink, NotifyFailurePolicy, Positioned, RawRecord,
    RowPosition,
};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// How current content relates to the stored fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// No fingerprint stored yet
    FirstSeen,
    /// Stored fingerprint differs from current content
    Modified,
    /// Stored fingerprint equals current content
    Unchanged,
}

impl Change {
    /// Compare a stored fingerprint with the current one
    #[inline]
    #[must_use]
    pub fn detect(stored: Option<&Fingerprint>, current: &Fingerprint) -> Self {
        match stored {
            None => Self::FirstSeen,
            Some(stored) if stored == current => Self::Unchanged,
            Some(_) => Self::Modified,
        }
    }
}

/// Result of checking a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Required field missing; nothing fetched or written
    Skipped(MissingField),
    /// Content matches the stored fingerprint
    Unchanged,
    /// First observation; fingerprint stored without notifying
    Baselined,
    /// Change notice sent and fingerprint stored
    Notified,
    /// Change notice failed
    NotifyFailed {
        /// Send failure
        error: NotifyError,
        /// Whether the new fingerprint was stored anyway
        fingerprint_advanced: bool,
    },
    /// Content could not be fetched; record left untouched
    FetchFailed(FetchError),
    /// The fingerprint write-back failed
    UpdateFailed {
        /// What the write was recording
        change: Change,
        /// Send failure preceding the write, if any
        notify_error: Option<NotifyError>,
        /// Write failure
        error: StoreError,
    },
}

impl RecordOutcome {
    /// Whether the record hit a failure
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NotifyFailed { .. } | Self::FetchFailed(_) | Self::UpdateFailed { .. }
        )
    }

    /// Whether a change notice reached the channel
    #[inline]
    #[must_use]
    pub fn notified(&self) -> bool {
        matches!(self, Self::Notified)
            || matches!(
                self,
                Self::UpdateFailed {
                    change: Change::Modified,
                    notify_error: None,
                    ..
                }
            )
    }
}

impl Display for RecordOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(field) => write!(f, "skipped (missing {field})"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Baselined => f.write_str("baseline recorded"),
            Self::Notified => f.write_str("change notified"),
            Self::NotifyFailed {
                error,
                fingerprint_advanced,
            } => {
                let kept = if *fingerprint_advanced {
                    "fingerprint advanced"
                } else {
                    "fingerprint kept"
                };
                write!(f, "notification failed ({kept}): {error}")
            }
            Self::FetchFailed(error) => write!(f, "fetch failed: {error}"),
            Self::UpdateFailed { error, .. } => write!(f, "fingerprint update failed: {error}"),
        }
    }
}

/// Outcome of one record, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    /// Store row
    pub position: RowPosition,
    /// Link as read, if present
    pub link: Option<String>,
    /// What happened
    pub outcome: RecordOutcome,
}

/// Per-outcome counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records loaded
    pub total: usize,
    /// Records skipped for missing fields
    pub skipped: usize,
    /// Records with a new baseline
    pub baselined: usize,
    /// Records unchanged
    pub unchanged: usize,
    /// Records whose change was notified
    pub notified: usize,
    /// Records with any failure
    pub failed: usize,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records: {} notified, {} baselined, {} unchanged, {} skipped, {} failed",
            self.total, self.notified, self.baselined, self.unchanged, self.skipped, self.failed
        )
    }
}

/// Everything a run did, in store order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Side effects were suppressed
    pub dry_run: bool,
    /// One entry per loaded record
    pub records: Vec<RecordReport>,
}

impl RunReport {
    /// Empty report
    #[inline]
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            records: Vec::new(),
        }
    }

    /// Outcome for the record at `position`
    #[must_use]
    pub fn outcome_at(&self, position: RowPosition) -> Option<&RecordOutcome> {
        self.records
            .iter()
            .find(|r| r.position == position)
            .map(|r| &r.outcome)
    }

    /// Count outcomes
    ///
    /// A notice that went out before a failed write-back counts as both
    /// notified and failed.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.records.len(),
            ..RunSummary::default()
        };
        for record in &self.records {
            let outcome = &record.outcome;
            match outcome {
                RecordOutcome::Skipped(_) => summary.skipped += 1,
                RecordOutcome::Unchanged => summary.unchanged += 1,
                RecordOutcome::Baselined => summary.baselined += 1,
                _ => {}
            }
            if outcome.notified() {
                summary.notified += 1;
            }
            if outcome.is_failure() {
                summary.failed += 1;
            }
        }
        summary
    }
}

/// Runs the check-and-notify pass over every monitored link
pub struct ChangeMonitor {
    store: Arc<dyn RecordStore>,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    options: MonitorOptions,
}

impl ChangeMonitor {
    /// Create a monitor with default options
    pub fn new(
        store: Arc<dyn RecordStore>,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            fetcher,
            notifier,
            options: MonitorOptions::default(),
        }
    }

    /// With run options
    #[must_use]
    pub fn with_options(mut self, options: MonitorOptions) -> Self {
        self.options = options;
        self
    }

    /// Active options
    #[inline]
    #[must_use]
    pub fn options(&self) -> MonitorOptions {
        self.options
    }

    /// Check every record once, in stored order
    ///
    /// # Errors
    /// Returns `WatchError::StoreConnection` if the records cannot be loaded.
    /// Nothing is fetched or sent in that case. Per-record failures never
    /// surface here.
    pub async fn run(&self) -> Result<RunReport, WatchError> {
        let rows = self
            .store
            .load_all()
            .await
            .map_err(WatchError::StoreConnection)?;
        tracing::info!(
            count = rows.len(),
            dry_run = self.options.dry_run,
            "loaded monitored links"
        );

        let mut report = RunReport::new(self.options.dry_run);
        for row in rows {
            let outcome = self.check_record(&row).await;
            let entry = RecordReport {
                position: row.position,
                link: row.record.link,
                outcome,
            };
            log_record(&entry);
            report.records.push(entry);
        }

        tracing::info!(summary = %report.summary(), "run complete");
        Ok(report)
    }

    /// Check one record and apply the resulting side effects
    pub async fn check_record(&self, row: &Positioned<RawRecord>) -> RecordOutcome {
        let record = match MonitoredLink::try_from(row.record.clone()) {
            Ok(record) => record,
            Err(missing) => return RecordOutcome::Skipped(missing),
        };

        tracing::debug!(position = %row.position, link = %record.link, "checking link");
        let body = match self.fetcher.fetch(&record.link).await {
            Ok(body) => body,
            Err(error) => return RecordOutcome::FetchFailed(error),
        };
        let current = Fingerprint::compute(body.as_bytes());

        match Change::detect(record.fingerprint.as_ref(), &current) {
            Change::Unchanged => RecordOutcome::Unchanged,
            Change::FirstSeen => {
                match self.persist(row.position, &current).await {
                    Ok(()) => RecordOutcome::Baselined,
                    Err(error) => RecordOutcome::UpdateFailed {
                        change: Change::FirstSeen,
                        notify_error: None,
                        error,
                    },
                }
            }
            Change::Modified => self.handle_change(row.position, &record, &current).await,
        }
    }

    async fn handle_change(
        &self,
        position: RowPosition,
        record: &MonitoredLink,
        current: &Fingerprint,
    ) -> RecordOutcome {
        let notify_error = if self.options.dry_run {
            None
        } else {
            let notice = ChangeNotice::new(record.link.clone());
            self.notifier
                .notify(&record.recipient, &notice)
                .await
                .err()
        };

        if let Some(error) = &notify_error {
            if self.options.notify_failure == NotifyFailurePolicy::RetryNextRun {
                return RecordOutcome::NotifyFailed {
                    error: error.clone(),
                    fingerprint_advanced: false,
                };
            }
        }

        match (self.persist(position, current).await, notify_error) {
            (Ok(()), None) => RecordOutcome::Notified,
            (Ok(()), Some(error)) => RecordOutcome::NotifyFailed {
                error,
                fingerprint_advanced: true,
            },
            (Err(error), notify_error) => RecordOutcome::UpdateFailed {
                change: Change::Modified,
                notify_error,
                error,
            },
        }
    }

    async fn persist(
        &self,
        position: RowPosition,
        fingerprint: &Fingerprint,
    ) -> Result<(), StoreError> {
        if self.options.dry_run {
            return Ok(());
        }
        self.store.update_fingerprint(position, fingerprint).await
    }
}

fn log_record(entry: &RecordReport) {
    let link = entry.link.as_deref().unwrap_or("");
    let position = &entry.position;
    let outcome = &entry.outcome;
    match outcome {
        RecordOutcome::Skipped(_) | RecordOutcome::Unchanged => {
            tracing::debug!(%position, link, %outcome, "record checked");
        }
        RecordOutcome::Baselined | RecordOutcome::Notified => {
            tracing::info!(%position, link, %outcome, "record checked");
        }
        RecordOutcome::NotifyFailed { .. }
        | RecordOutcome::FetchFailed(_)
        | RecordOutcome::UpdateFailed { .. } => {
            tracing::warn!(%position, link, %outcome, "record failed");
        }
    }
}
