//! Page fetcher over reqwest

use sheetwatch_core::{ConfigError, FetchError, Fetcher};
use std::time::Duration;

/// Identifying client header sent with every page request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Bound on a single page request
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

const MAX_REDIRECTS: usize = 10;

/// Fetches monitored links with a fixed user agent and timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if the HTTP client cannot be built,
    /// e.g. for a user agent that is not a valid header value.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|error| ConfigError::Invalid {
                field: "user_agent",
                reason: error.without_url().to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, link: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response.text().await.map_err(classify)
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(error.without_url().to_string())
    }
}
