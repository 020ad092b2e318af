//! [`BrowsingPage`] backed by a Chrome instance driven over CDP.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{poll_for_selector, BrowsingPage};
use crate::error::BrowserError;

/// Interval between selector polls in `wait_for_selector`.
const SELECTOR_POLL_MS: u64 = 250;

const IS_ENABLED_JS: &str =
    "function() { return !this.disabled && this.getAttribute('aria-disabled') !== 'true'; }";

/// Common install locations checked when the system Chrome is requested.
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/opt/google/chrome/google-chrome",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
    "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
];

#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    /// Prefer an installed Google Chrome over whatever Chromium is found
    /// on `PATH`.
    pub system_chrome: bool,
    /// Explicit executable; wins over every other lookup.
    pub chrome_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            system_chrome: false,
            chrome_path: None,
            navigation_timeout: Duration::from_secs(60),
        }
    }
}

fn find_system_chrome() -> Option<PathBuf> {
    CHROME_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

/// One Chrome tab. Dropping it without [`ChromePage::close`] leaves the
/// browser to be killed when the handler task ends.
pub struct ChromePage {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromePage {
    /// Launch Chrome and open a blank tab.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Launch`] if the browser cannot be configured,
    /// started, or asked for a tab.
    pub async fn launch(options: &ChromeOptions) -> Result<Self, BrowserError> {
        let executable = options.chrome_path.clone().or_else(|| {
            if options.system_chrome {
                let found = find_system_chrome();
                if found.is_none() {
                    tracing::warn!("system Chrome not found; falling back to default lookup");
                }
                found
            } else {
                None
            }
        });

        let mut builder = BrowserConfig::builder()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--lang=en-US")
            .window_size(1366, 900);
        if let Some(path) = &executable {
            builder = builder.chrome_executable(path);
        }
        // with_head means NOT headless
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        tracing::info!(headless = options.headless, executable = ?executable, "launching browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            handler,
            navigation_timeout: options.navigation_timeout,
        })
    }

    /// Close the browser and stop its handler task.
    pub async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            tracing::debug!(error = %err, "browser close failed");
        }
        self.handler.abort();
    }

    async fn nth(&self, selector: &str, index: usize) -> Result<Option<Element>, BrowserError> {
        let mut elements = self
            .page
            .find_elements(selector)
            .await
            .or_else(|e| not_found_is_empty(selector, &e))?;
        if index >= elements.len() {
            return Ok(None);
        }
        Ok(Some(elements.swap_remove(index)))
    }

    async fn require(&self, selector: &str, index: usize) -> Result<Element, BrowserError> {
        self.nth(selector, index)
            .await?
            .ok_or_else(|| BrowserError::Element {
                selector: selector.to_string(),
                reason: format!("no match at index {index}"),
            })
    }
}

/// `find_elements` reports "no node" as an error; treat it as zero matches.
fn not_found_is_empty(
    selector: &str,
    err: &chromiumoxide::error::CdpError,
) -> Result<Vec<Element>, BrowserError> {
    if matches!(err, chromiumoxide::error::CdpError::NotFound) {
        return Ok(Vec::new());
    }
    Err(element_error(selector, err))
}

/// `value` as a quoted JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn element_error(selector: &str, err: &impl std::fmt::Display) -> BrowserError {
    BrowserError::Element {
        selector: selector.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl BrowsingPage for ChromePage {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        let navigation_error = |reason: String| BrowserError::Navigation {
            url: url.to_string(),
            reason,
        };
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| {
                navigation_error(format!(
                    "timed out after {}s",
                    self.navigation_timeout.as_secs()
                ))
            })?
            .map_err(|e| navigation_error(e.to_string()))?;
        Ok(())
    }

    async fn wait(&mut self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    async fn count(&mut self, selector: &str) -> Result<usize, BrowserError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .or_else(|e| not_found_is_empty(selector, &e))?;
        Ok(elements.len())
    }

    async fn text(&mut self, selector: &str, index: usize) -> Result<Option<String>, BrowserError> {
        let Some(element) = self.nth(selector, index).await? else {
            return Ok(None);
        };
        element
            .inner_text()
            .await
            .map_err(|e| element_error(selector, &e))
    }

    async fn attribute(
        &mut self,
        selector: &str,
        index: usize,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let Some(element) = self.nth(selector, index).await? else {
            return Ok(None);
        };
        element
            .attribute(name)
            .await
            .map_err(|e| element_error(selector, &e))
    }

    async fn attributes(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Vec<Option<String>>, BrowserError> {
        let script = format!(
            "Array.from(document.querySelectorAll({})).map(e => e.getAttribute({}))",
            js_string(selector),
            js_string(name)
        );
        self.page
            .evaluate(script)
            .await
            .map_err(|e| element_error(selector, &e))?
            .into_value::<Vec<Option<String>>>()
            .map_err(|e| element_error(selector, &e))
    }

    async fn click(&mut self, selector: &str, index: usize) -> Result<(), BrowserError> {
        let element = self.require(selector, index).await?;
        element
            .click()
            .await
            .map_err(|e| element_error(selector, &e))?;
        Ok(())
    }

    async fn is_enabled(&mut self, selector: &str, index: usize) -> Result<bool, BrowserError> {
        let Some(element) = self.nth(selector, index).await? else {
            return Ok(false);
        };
        let returned = element
            .call_js_fn(IS_ENABLED_JS, false)
            .await
            .map_err(|e| element_error(selector, &e))?;
        Ok(returned
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn evaluate(&mut self, script: &str) -> Result<(), BrowserError> {
        self.page
            .evaluate(script.to_string())
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(())
    }

    async fn evaluate_on(
        &mut self,
        selector: &str,
        index: usize,
        function: &str,
    ) -> Result<(), BrowserError> {
        let element = self.require(selector, index).await?;
        element
            .call_js_fn(function, false)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(())
    }

    async fn row_cells(
        &mut self,
        row_selector: &str,
        cell_selector: &str,
    ) -> Result<Vec<Vec<String>>, BrowserError> {
        let rows = self
            .page
            .find_elements(row_selector)
            .await
            .or_else(|e| not_found_is_empty(row_selector, &e))?;

        let mut table = Vec::with_capacity(rows.len());
        for row in rows {
            let cells = row
                .find_elements(cell_selector)
                .await
                .or_else(|e| not_found_is_empty(cell_selector, &e))?;
            let mut texts = Vec::with_capacity(cells.len());
            for cell in cells {
                let text = cell
                    .inner_text()
                    .await
                    .map_err(|e| element_error(cell_selector, &e))?;
                texts.push(text.unwrap_or_default().trim().to_string());
            }
            table.push(texts);
        }
        Ok(table)
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        poll_for_selector(
            self,
            selector,
            timeout,
            Duration::from_millis(SELECTOR_POLL_MS),
        )
        .await
    }
}
