//! Scripted in-memory browsing backend and progress sink for tests.
//!
//! [`FakePage`] serves static listing views keyed by URL and, optionally, a
//! results feed that grows as it is scrolled and pages forward when its
//! "next page" control is clicked. Waits are recorded, never slept.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use mapscrape_core::{Record, SelectorSet};

use crate::browser::BrowsingPage;
use crate::error::BrowserError;
use crate::progress::{LogLevel, Progress};

/// One element of a static view.
#[derive(Debug, Clone)]
pub struct FakeElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub enabled: bool,
}

impl FakeElement {
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            attrs: HashMap::new(),
            enabled: true,
        }
    }
}

/// Static content served for one URL.
#[derive(Debug, Clone, Default)]
pub struct FakeView {
    elements: HashMap<String, Vec<FakeElement>>,
    tables: HashMap<String, Vec<Vec<String>>>,
    click_reveals: HashMap<String, (String, Vec<Vec<String>>)>,
    failing: HashSet<String>,
}

impl FakeView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element with visible `text` under `selector`.
    #[must_use]
    pub fn text(mut self, selector: &str, text: &str) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(FakeElement::with_text(text));
        self
    }

    /// Add an element under `selector` carrying attribute `name`.
    #[must_use]
    pub fn attr(mut self, selector: &str, name: &str, value: &str) -> Self {
        let mut element = FakeElement::with_text("");
        element.attrs.insert(name.to_string(), value.to_string());
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(element);
        self
    }

    /// Serve `rows` for `row_selector` regardless of the cell selector.
    #[must_use]
    pub fn table(mut self, row_selector: &str, rows: &[&[&str]]) -> Self {
        self.tables.insert(row_selector.to_string(), to_rows(rows));
        self
    }

    /// A clickable `button` that makes `rows` appear under `row_selector`.
    #[must_use]
    pub fn table_behind(mut self, button: &str, row_selector: &str, rows: &[&[&str]]) -> Self {
        self.elements
            .entry(button.to_string())
            .or_default()
            .push(FakeElement::with_text(""));
        self.click_reveals
            .insert(button.to_string(), (row_selector.to_string(), to_rows(rows)));
        self
    }

    /// Every read of `selector` fails with [`BrowserError::Element`].
    #[must_use]
    pub fn failing(mut self, selector: &str) -> Self {
        self.failing.insert(selector.to_string());
        self
    }

    fn check(&self, selector: &str) -> Result<(), BrowserError> {
        if self.failing.contains(selector) {
            return Err(BrowserError::Element {
                selector: selector.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

fn to_rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
        .collect()
}

/// A paginated results feed. Each scroll reveals `per_scroll` more cards of
/// the current page.
#[derive(Debug, Clone)]
pub struct FakeFeed {
    url: String,
    pages: Vec<Vec<String>>,
    per_scroll: usize,
    card_selector: String,
    ready_selector: String,
    panel_selector: Option<String>,
    next_selector: Option<String>,
    page: usize,
    revealed: usize,
}

impl FakeFeed {
    /// A feed at `url` whose cards match the `listing_cards` and
    /// `listing_ready` selectors of `selectors`. The results panel and the
    /// first "next page" variant are present.
    #[must_use]
    pub fn new(url: &str, pages: Vec<Vec<String>>, per_scroll: usize, selectors: &SelectorSet) -> Self {
        Self {
            url: url.to_string(),
            pages,
            per_scroll,
            card_selector: selectors.listing_cards.clone(),
            ready_selector: selectors.listing_ready.clone(),
            panel_selector: Some(selectors.results_panel.clone()),
            next_selector: selectors.next_page.first().cloned(),
            page: 0,
            revealed: per_scroll,
        }
    }

    /// Serve the "next page" control under `selector` instead.
    #[must_use]
    pub fn with_next_selector(mut self, selector: Option<&str>) -> Self {
        self.next_selector = selector.map(str::to_string);
        self
    }

    /// Drop the results panel so the window itself is scrolled.
    #[must_use]
    pub fn without_panel(mut self) -> Self {
        self.panel_selector = None;
        self
    }

    fn visible_cards(&self) -> &[String] {
        let page = self.pages.get(self.page).map_or(&[][..], Vec::as_slice);
        &page[..self.revealed.min(page.len())]
    }

    fn has_next_page(&self) -> bool {
        self.page + 1 < self.pages.len()
    }

    fn scroll(&mut self) {
        self.revealed += self.per_scroll;
    }

    fn reset(&mut self) {
        self.page = 0;
        self.revealed = self.per_scroll;
    }

    fn is_card(&self, selector: &str) -> bool {
        selector == self.card_selector || selector == self.ready_selector
    }

    fn is_panel(&self, selector: &str) -> bool {
        self.panel_selector.as_deref() == Some(selector)
    }

    fn is_next(&self, selector: &str) -> bool {
        self.next_selector.as_deref() == Some(selector)
    }
}

/// Scripted [`BrowsingPage`].
#[derive(Debug, Default)]
pub struct FakePage {
    views: HashMap<String, FakeView>,
    feed: Option<FakeFeed>,
    current: Option<String>,
    failing_urls: HashSet<String>,
    failing_scrolls: usize,
    flaky_counts: HashMap<String, usize>,
    /// Every URL passed to `navigate`, including failed ones.
    pub visited: Vec<String>,
    /// Selectors of every successful click.
    pub clicks: Vec<String>,
    /// Total milliseconds requested through `wait`.
    pub waited_ms: u64,
    /// Successful scroll evaluations.
    pub scrolls: usize,
    /// Single-element `attribute` reads.
    pub attribute_reads: usize,
    /// Bulk `attributes` reads.
    pub bulk_reads: usize,
}

impl FakePage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_view(mut self, url: &str, view: FakeView) -> Self {
        self.views.insert(url.to_string(), view);
        self
    }

    #[must_use]
    pub fn with_feed(mut self, feed: FakeFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Navigation to `url` fails.
    #[must_use]
    pub fn failing_navigation(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    /// The next `n` scroll evaluations fail.
    #[must_use]
    pub fn failing_scrolls(mut self, n: usize) -> Self {
        self.failing_scrolls = n;
        self
    }

    /// The next `n` `count` calls for `selector` fail.
    #[must_use]
    pub fn flaky_count(mut self, selector: &str, n: usize) -> Self {
        self.flaky_counts.insert(selector.to_string(), n);
        self
    }

    fn active_feed(&self) -> Option<&FakeFeed> {
        let current = self.current.as_deref()?;
        self.feed.as_ref().filter(|feed| feed.url == current)
    }

    fn active_feed_mut(&mut self) -> Option<&mut FakeFeed> {
        let current = self.current.clone()?;
        self.feed.as_mut().filter(|feed| feed.url == current)
    }

    fn view(&self) -> Option<&FakeView> {
        self.views.get(self.current.as_deref()?)
    }

    fn elements(&self, selector: &str) -> Result<&[FakeElement], BrowserError> {
        let Some(view) = self.view() else {
            return Ok(&[]);
        };
        view.check(selector)?;
        Ok(view.elements.get(selector).map_or(&[][..], Vec::as_slice))
    }

    fn scroll(&mut self) -> Result<(), BrowserError> {
        if self.failing_scrolls > 0 {
            self.failing_scrolls -= 1;
            return Err(BrowserError::Script("scripted scroll failure".to_string()));
        }
        self.scrolls += 1;
        if let Some(feed) = self.active_feed_mut() {
            feed.scroll();
        }
        Ok(())
    }
}

#[async_trait]
impl BrowsingPage for FakePage {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.visited.push(url.to_string());
        if self.failing_urls.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "scripted navigation failure".to_string(),
            });
        }
        self.current = Some(url.to_string());
        if let Some(feed) = self.active_feed_mut() {
            feed.reset();
        }
        Ok(())
    }

    async fn wait(&mut self, ms: u64) {
        self.waited_ms += ms;
    }

    async fn count(&mut self, selector: &str) -> Result<usize, BrowserError> {
        if let Some(remaining) = self.flaky_counts.get_mut(selector) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BrowserError::Element {
                    selector: selector.to_string(),
                    reason: "scripted transient failure".to_string(),
                });
            }
        }
        if let Some(feed) = self.active_feed() {
            if feed.is_card(selector) {
                return Ok(feed.visible_cards().len());
            }
            if feed.is_panel(selector) || feed.is_next(selector) {
                return Ok(1);
            }
        }
        Ok(self.elements(selector)?.len())
    }

    async fn text(&mut self, selector: &str, index: usize) -> Result<Option<String>, BrowserError> {
        Ok(self.elements(selector)?.get(index).map(|e| e.text.clone()))
    }

    async fn attribute(
        &mut self,
        selector: &str,
        index: usize,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.attribute_reads += 1;
        if let Some(feed) = self.active_feed() {
            if feed.is_card(selector) {
                return Ok((name == "href")
                    .then(|| feed.visible_cards().get(index).cloned())
                    .flatten());
            }
        }
        Ok(self
            .elements(selector)?
            .get(index)
            .and_then(|e| e.attrs.get(name).cloned()))
    }

    async fn attributes(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Vec<Option<String>>, BrowserError> {
        self.bulk_reads += 1;
        if let Some(feed) = self.active_feed() {
            if feed.is_card(selector) {
                return Ok(feed
                    .visible_cards()
                    .iter()
                    .map(|href| (name == "href").then(|| href.clone()))
                    .collect());
            }
        }
        Ok(self
            .elements(selector)?
            .iter()
            .map(|e| e.attrs.get(name).cloned())
            .collect())
    }

    async fn click(&mut self, selector: &str, index: usize) -> Result<(), BrowserError> {
        if let Some(feed) = self.active_feed_mut() {
            if feed.is_next(selector) {
                if !feed.has_next_page() {
                    return Err(BrowserError::Element {
                        selector: selector.to_string(),
                        reason: "control is disabled".to_string(),
                    });
                }
                feed.page += 1;
                feed.revealed = feed.per_scroll;
                self.clicks.push(selector.to_string());
                return Ok(());
            }
        }

        if self.elements(selector)?.get(index).is_none() {
            return Err(BrowserError::Element {
                selector: selector.to_string(),
                reason: "no such element".to_string(),
            });
        }
        self.clicks.push(selector.to_string());

        let current = self.current.clone().unwrap_or_default();
        if let Some(view) = self.views.get_mut(&current) {
            if let Some((rows_selector, rows)) = view.click_reveals.get(selector).cloned() {
                view.tables.insert(rows_selector, rows);
            }
        }
        Ok(())
    }

    async fn is_enabled(&mut self, selector: &str, index: usize) -> Result<bool, BrowserError> {
        if let Some(feed) = self.active_feed() {
            if feed.is_next(selector) {
                return Ok(feed.has_next_page());
            }
        }
        Ok(self
            .elements(selector)?
            .get(index)
            .is_some_and(|e| e.enabled))
    }

    async fn evaluate(&mut self, _script: &str) -> Result<(), BrowserError> {
        self.scroll()
    }

    async fn evaluate_on(
        &mut self,
        selector: &str,
        _index: usize,
        _function: &str,
    ) -> Result<(), BrowserError> {
        let is_panel = self.active_feed().is_some_and(|feed| feed.is_panel(selector));
        if !is_panel && self.elements(selector)?.is_empty() {
            return Err(BrowserError::Element {
                selector: selector.to_string(),
                reason: "no such element".to_string(),
            });
        }
        self.scroll()
    }

    async fn row_cells(
        &mut self,
        row_selector: &str,
        _cell_selector: &str,
    ) -> Result<Vec<Vec<String>>, BrowserError> {
        let Some(view) = self.view() else {
            return Ok(Vec::new());
        };
        view.check(row_selector)?;
        Ok(view.tables.get(row_selector).cloned().unwrap_or_default())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        if self.count(selector).await? > 0 {
            return Ok(());
        }
        Err(BrowserError::Timeout {
            selector: selector.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// Progress sink that records every call.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub began: Option<usize>,
    pub messages: Vec<(LogLevel, String)>,
    pub completed: Vec<usize>,
    pub finished: bool,
}

impl RecordingProgress {
    /// `true` if any message at `level` contains `needle`.
    #[must_use]
    pub fn logged(&self, level: LogLevel, needle: &str) -> bool {
        self.messages
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl Progress for RecordingProgress {
    fn begin(&mut self, total: usize) {
        self.began = Some(total);
    }

    fn log(&mut self, level: LogLevel, msg: &str) {
        self.messages.push((level, msg.to_string()));
    }

    fn item_done(&mut self, record: &Record) {
        self.completed.push(record.s_no);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
