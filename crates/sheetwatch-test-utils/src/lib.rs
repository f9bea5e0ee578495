//! Testing utilities for the sheetwatch workspace
//!
//! In-memory stand-ins for the store, the page fetcher and the notifier.
//! Each one records the calls it receives so tests can assert on side
//! effects.

#![allow(missing_docs)]

use parking_lot::Mutex;
use sheetwatch_core::{
    ChangeNotice, FetchError, Fetcher, Fingerprint, Notifier, NotifyError, Positioned, RawRecord,
    RecipientId, RecordStore, RowPosition, StoreError,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Spreadsheet-like store backed by a vector of rows
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Positioned<RawRecord>>>,
    load_error: Mutex<Option<StoreError>>,
    failing_rows: Mutex<HashSet<RowPosition>>,
    loads: Mutex<usize>,
    updates: Mutex<Vec<(RowPosition, Fingerprint)>>,
}

impl MemoryStore {
    /// Store whose data rows are `(link, recipient_id, content_fingerprint)` cells
    pub fn from_rows(rows: &[(&str, &str, &str)]) -> Arc<Self> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, (link, recipient, fp))| {
                Positioned::new(
                    RowPosition::from_data_index(i),
                    RawRecord::from_cells(link, recipient, fp),
                )
            })
            .collect();
        Arc::new(Self {
            rows: Mutex::new(rows),
            ..Self::default()
        })
    }

    /// Make `load_all` fail
    pub fn fail_load(&self, error: StoreError) {
        *self.load_error.lock() = Some(error);
    }

    /// Make updates to `position` fail
    pub fn fail_updates_at(&self, position: RowPosition) {
        self.failing_rows.lock().insert(position);
    }

    /// Stored fingerprint text at `position`
    pub fn fingerprint_at(&self, position: RowPosition) -> Option<String> {
        self.rows
            .lock()
            .iter()
            .find(|r| r.position == position)
            .and_then(|r| r.record.content_fingerprint.clone())
    }

    /// Every successful write, in order
    pub fn updates(&self) -> Vec<(RowPosition, Fingerprint)> {
        self.updates.lock().clone()
    }

    /// Number of `load_all` calls
    pub fn load_count(&self) -> usize {
        *self.loads.lock()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<Positioned<RawRecord>>, StoreError> {
        *self.loads.lock() += 1;
        if let Some(error) = self.load_error.lock().clone() {
            return Err(error);
        }
        Ok(self.rows.lock().clone())
    }

    async fn update_fingerprint(
        &self,
        position: RowPosition,
        fingerprint: &Fingerprint,
    ) -> Result<(), StoreError> {
        if self.failing_rows.lock().contains(&position) {
            return Err(StoreError::Http {
                status: Some(500),
                message: format!("write to {position} refused"),
            });
        }
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|r| r.position == position)
            .ok_or_else(|| StoreError::NotFound(position.to_string()))?;
        row.record.content_fingerprint = Some(fingerprint.to_string());
        self.updates.lock().push((position, fingerprint.clone()));
        Ok(())
    }
}

/// Fetcher serving fixed bodies per link
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<String, Result<String, FetchError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `body` for `link`
    pub fn serve(&self, link: &str, body: &str) {
        self.pages
            .lock()
            .insert(link.to_string(), Ok(body.to_string()));
    }

    /// Fail every fetch of `link`
    pub fn fail(&self, link: &str, error: FetchError) {
        self.pages.lock().insert(link.to_string(), Err(error));
    }

    /// Links fetched, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, link: &str) -> Result<String, FetchError> {
        self.calls.lock().push(link.to_string());
        self.pages
            .lock()
            .get(link)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Status(404)))
    }
}

/// Notifier that remembers every notice
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(RecipientId, ChangeNotice)>>,
    failing: Mutex<HashSet<String>>,
    attempts: Mutex<usize>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reject every notice for `recipient`
    pub fn fail_for(&self, recipient: &str) {
        self.failing.lock().insert(recipient.to_string());
    }

    /// Notices accepted, in order
    pub fn sent(&self) -> Vec<(RecipientId, ChangeNotice)> {
        self.sent.lock().clone()
    }

    /// Sends attempted, including rejected ones
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        recipient: &RecipientId,
        notice: &ChangeNotice,
    ) -> Result<(), NotifyError> {
        *self.attempts.lock() += 1;
        if self.failing.lock().contains(recipient.as_str()) {
            return Err(NotifyError::Rejected {
                status: Some(400),
                description: "Bad Request: chat not found".to_string(),
            });
        }
        self.sent.lock().push((recipient.clone(), notice.clone()));
        Ok(())
    }
}
