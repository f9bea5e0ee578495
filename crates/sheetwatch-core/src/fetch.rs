//! Resource fetch seam

use crate::error::FetchError;

/// Retrieves the current content of a monitored link
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `link` and return its decoded body
    ///
    /// Implementations bound the request by a timeout and treat non-success
    /// statuses as errors.
    ///
    /// # Errors
    /// Returns `FetchError` on transport failure, timeout or bad status.
    async fn fetch(&self, link: &str) -> Result<String, FetchError>;
}
