//! Record store seam

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use crate::types::{Positioned, RawRecord, RowPosition};

/// Tabular store holding the monitored links
///
/// Records are read once per run and written back one field at a time,
/// addressed by the position they were loaded from.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Load every data row in stored order
    ///
    /// # Errors
    /// Any failure here means the store could not be reached or read; the
    /// run aborts.
    async fn load_all(&self) -> Result<Vec<Positioned<RawRecord>>, StoreError>;

    /// Replace the fingerprint of the record at `position`
    ///
    /// # Errors
    /// Returns `StoreError` if the write did not go through. The caller
    /// treats this as a per-record failure.
    async fn update_fingerprint(
        &self,
        position: RowPosition,
        fingerprint: &Fingerprint,
    ) -> Result<(), StoreError>;
}
