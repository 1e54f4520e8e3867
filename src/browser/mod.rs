//! Browser capability traits used by the scraping core.
//!
//! The search controller, the pagination loop and the field extractors only
//! talk to a browser through two traits:
//!
//! - [`BrowserSession`]: page-level operations (navigate, locate, wait, select)
//! - [`ElementHandle`]: operations on one located element
//!
//! [`chrome::ChromeSession`] implements them over the Chrome DevTools Protocol.
//! Tests use an in-memory implementation over static HTML fixtures.
//!
//! # Waiting
//!
//! Waits are polls with a bounded timeout. A timeout is returned as
//! [`BrowserError::Timeout`]; callers decide whether that is fatal.

pub mod chrome;
#[cfg(test)]
pub mod fixture;

use chromiumoxide::error::CdpError;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};

/// Interval between two checks of a polled condition.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Errors raised by browser interactions.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The DevTools protocol call failed.
    #[error("CDP error: {0}")]
    Cdp(Box<CdpError>),

    /// No element matched the selector.
    #[error("Element not found: {0}")]
    NotFound(String),

    /// A polled condition did not hold before the deadline.
    #[error("Timeout after {after:?} waiting for: {what}")]
    Timeout { what: String, after: Duration },

    /// A script evaluated in the page failed or returned an unexpected value.
    #[error("Script error: {0}")]
    Script(String),

    /// The browser process could not be started.
    #[error("Failed to launch browser: {0}")]
    Launch(String),
}

impl From<CdpError> for BrowserError {
    fn from(err: CdpError) -> Self {
        BrowserError::Cdp(Box::new(err))
    }
}

/// One element located on the current page.
///
/// A handle may go stale when the page re-renders underneath it; after that
/// every operation on it fails and it has to be located again.
pub trait ElementHandle: Sized {
    /// Locate the first descendant matching a CSS selector.
    async fn find_child(&self, selector: &str) -> Result<Self, BrowserError>;

    /// Read an attribute. `Ok(None)` when the element has no such attribute.
    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError>;

    /// Rendered text of the element, trimmed.
    async fn text(&self) -> Result<String, BrowserError>;

    /// Whether the handle no longer refers to a node attached to the page.
    async fn is_stale(&self) -> bool;

    async fn click(&self) -> Result<(), BrowserError>;

    /// Focus the element and type `text` into it.
    async fn type_text(&self, text: &str) -> Result<(), BrowserError>;

    async fn press_enter(&self) -> Result<(), BrowserError>;
}

/// An open browser tab the scraper drives.
pub trait BrowserSession {
    type Element: ElementHandle;

    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// Locate the first element matching a CSS selector.
    async fn find(&self, selector: &str) -> Result<Self::Element, BrowserError>;

    /// Locate every element matching a CSS selector, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, BrowserError>;

    /// Whether an element matching the selector is currently rendered.
    async fn is_visible(&self, selector: &str) -> Result<bool, BrowserError>;

    /// Select the option of a `<select>` whose label equals `option_text`.
    async fn select_option_by_text(
        &self,
        select_selector: &str,
        option_text: &str,
    ) -> Result<(), BrowserError>;

    /// Save a full-page screenshot.
    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError>;

    /// Close the browser. Consumes the session.
    async fn quit(self) -> Result<(), BrowserError>;

    /// Poll until an element matching the selector is visible.
    async fn wait_until_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            // Lookup errors while the page is still loading count as "not yet".
            if self.is_visible(selector).await.unwrap_or(false) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    what: format!("visibility of '{selector}'"),
                    after: timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Poll until `element` has been detached from the page.
    async fn wait_until_stale(
        &self,
        element: &Self::Element,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if element.is_stale().await {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    what: "element to go stale".to_string(),
                    after: timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
