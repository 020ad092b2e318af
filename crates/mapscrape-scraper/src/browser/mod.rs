//! The browsing capability the scraper drives.
//!
//! Elements are addressed by `(selector, index)` pairs, where `index` picks
//! one match of `selector` in document order. Backends resolve the selector
//! on every call so a page that re-renders between calls is handled the same
//! way as a static one.

#[cfg(feature = "chrome")]
mod chrome;

#[cfg(feature = "chrome")]
pub use chrome::{ChromeOptions, ChromePage};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserError;

/// Scroll an element by its own height. Evaluated with the element as `this`.
pub const SCROLL_ELEMENT_JS: &str = "function() { this.scrollBy(0, this.scrollHeight); }";

/// Scroll the window by the document height.
pub const SCROLL_WINDOW_JS: &str = "window.scrollBy(0, document.body.scrollHeight)";

/// A single browser tab that can be navigated and queried.
#[async_trait]
pub trait BrowsingPage: Send {
    /// Navigate to `url` and wait for the initial load.
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Idle for `ms` milliseconds so the page can settle.
    async fn wait(&mut self, ms: u64);

    /// Number of elements currently matching `selector`.
    async fn count(&mut self, selector: &str) -> Result<usize, BrowserError>;

    /// Visible text of the `index`-th match, `None` if there is no such match.
    async fn text(&mut self, selector: &str, index: usize) -> Result<Option<String>, BrowserError>;

    /// Attribute `name` of the `index`-th match, `None` if the element or
    /// the attribute is missing.
    async fn attribute(
        &mut self,
        selector: &str,
        index: usize,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    /// Attribute `name` of every match of `selector`, in document order.
    async fn attributes(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Vec<Option<String>>, BrowserError> {
        let count = self.count(selector).await?;
        let mut values = Vec::with_capacity(count);
        for index in 0..count {
            values.push(self.attribute(selector, index, name).await?);
        }
        Ok(values)
    }

    /// Click the `index`-th match.
    async fn click(&mut self, selector: &str, index: usize) -> Result<(), BrowserError>;

    /// Whether the `index`-th match exists and accepts input.
    async fn is_enabled(&mut self, selector: &str, index: usize) -> Result<bool, BrowserError>;

    /// Evaluate `script` in the page.
    async fn evaluate(&mut self, script: &str) -> Result<(), BrowserError>;

    /// Call the function declaration `function` with the `index`-th match
    /// bound to `this`.
    async fn evaluate_on(
        &mut self,
        selector: &str,
        index: usize,
        function: &str,
    ) -> Result<(), BrowserError>;

    /// Text of every `cell_selector` match inside each `row_selector` match,
    /// one inner vector per row.
    async fn row_cells(
        &mut self,
        row_selector: &str,
        cell_selector: &str,
    ) -> Result<Vec<Vec<String>>, BrowserError>;

    /// Wait until at least one element matches `selector`.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError>;
}

/// Visible text of the first match of `selector`, trimmed.
///
/// Absence is not failure: a missing element, an empty text node and a
/// backend error all come back as `None`.
pub async fn read_text<P: BrowsingPage + ?Sized>(page: &mut P, selector: &str) -> Option<String> {
    match page.text(selector, 0).await {
        Ok(Some(text)) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Ok(None) => None,
        Err(err) => {
            tracing::debug!(selector, error = %err, "text lookup failed");
            None
        }
    }
}

/// Attribute `name` of the first match of `selector`, trimmed. Same absence
/// contract as [`read_text`].
pub async fn read_attribute<P: BrowsingPage + ?Sized>(
    page: &mut P,
    selector: &str,
    name: &str,
) -> Option<String> {
    match page.attribute(selector, 0, name).await {
        Ok(Some(value)) => {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }
        Ok(None) => None,
        Err(err) => {
            tracing::debug!(selector, attribute = name, error = %err, "attribute lookup failed");
            None
        }
    }
}

/// Poll `count(selector)` every `interval` until it is non-zero or
/// `timeout` elapses. Lookup errors while the page re-renders are logged and
/// polling continues.
///
/// # Errors
///
/// Returns [`BrowserError::Timeout`] if nothing matched before the deadline.
pub async fn poll_for_selector<P: BrowsingPage + ?Sized>(
    page: &mut P,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<(), BrowserError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match page.count(selector).await {
            Ok(n) if n > 0 => return Ok(()),
            Ok(_) => {}
            Err(err) => tracing::debug!(selector, error = %err, "selector poll failed"),
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(BrowserError::Timeout {
                selector: selector.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        tokio::time::sleep(interval).await;
    }
}

/// Click the first match of `selector` if there is one. Returns whether a
/// click happened.
pub async fn try_click<P: BrowsingPage + ?Sized>(page: &mut P, selector: &str) -> bool {
    match page.count(selector).await {
        Ok(0) => false,
        Ok(_) => match page.click(selector, 0).await {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(selector, error = %err, "click failed");
                false
            }
        },
        Err(err) => {
            tracing::debug!(selector, error = %err, "click target lookup failed");
            false
        }
    }
}
