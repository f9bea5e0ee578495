//! Notification seam and message rendering

use crate::error::NotifyError;
use crate::types::RecipientId;

/// Leading line of every change message
pub const CHANGE_HEADLINE: &str = "\u{26a0}\u{fe0f} Change detected at link:";

/// Message announcing that a monitored link changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    /// The link whose content changed
    pub link: String,
}

impl ChangeNotice {
    /// Create a notice for `link`
    #[inline]
    #[must_use]
    pub fn new(link: impl Into<String>) -> Self {
        Self { link: link.into() }
    }

    /// HTML body with the link rendered as an anchor
    #[must_use]
    pub fn html(&self) -> String {
        let href = html_escape::encode_double_quoted_attribute(&self.link);
        let text = html_escape::encode_text(&self.link);
        format!("{CHANGE_HEADLINE}\n<a href=\"{href}\">{text}</a>")
    }

    /// Plain text body
    #[must_use]
    pub fn plain(&self) -> String {
        format!("{CHANGE_HEADLINE}\n{}", self.link)
    }
}

/// Push channel that delivers change notices
///
/// Delivery is fire-and-forget: an `Ok` only means the channel accepted the
/// message.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Send `notice` to `recipient`
    ///
    /// # Errors
    /// Returns `NotifyError` if the channel could not be reached or refused
    /// the message.
    async fn notify(
        &self,
        recipient: &RecipientId,
        notice: &ChangeNotice,
    ) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_renders_anchor() {
        let notice = ChangeNotice::new("https://a.test/p");
        assert_eq!(
            notice.html(),
            "\u{26a0}\u{fe0f} Change detected at link:\n<a href=\"https://a.test/p\">https://a.test/p</a>"
        );
    }

    #[test]
    fn html_escapes_link() {
        let notice = ChangeNotice::new("https://a.test/?q=\"x\"&y=1");
        let html = notice.html();
        assert!(html.contains("href=\"https://a.test/?q=&quot;x&quot;&amp;y=1\""));
        assert!(html.ends_with("&amp;y=1</a>"));
    }

    #[test]
    fn plain_contains_link() {
        let notice = ChangeNotice::new("https://a.test/p");
        assert!(notice.plain().ends_with("\nhttps://a.test/p"));
    }
}
