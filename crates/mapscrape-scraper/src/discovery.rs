//! Listing discovery over a scrolling, paginated results view.
//!
//! Each round scrolls the results panel (or the window when there is no
//! panel), then collects listing references not seen before, in first-seen
//! order. After `stale_round_limit` consecutive rounds without a new
//! reference the loop tries to move to the next results page; when that is
//! impossible discovery ends.

use std::collections::HashSet;
use std::time::Duration;

use mapscrape_core::{DiscoveryConfig, SelectorSet};
use tokio_util::sync::CancellationToken;

use crate::browser::{BrowsingPage, SCROLL_ELEMENT_JS, SCROLL_WINDOW_JS};
use crate::progress::{emit, LogLevel, Progress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    Scrolling,
    Paginating,
    Done(DiscoveryEnd),
}

/// Why discovery stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryEnd {
    /// `max_listings` references were collected.
    LimitReached,
    /// The cancellation token fired.
    Cancelled,
    /// No new references and no further results page.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    /// Unique listing references in first-seen order.
    pub listings: Vec<String>,
    pub end: DiscoveryEnd,
    /// Scroll rounds performed.
    pub rounds: u32,
    /// Successful moves to a next results page.
    pub pages_advanced: u32,
}

/// Ordered, duplicate-free set of listing references with an optional cap.
#[derive(Debug, Default)]
struct ListingSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
    cap: Option<usize>,
}

impl ListingSet {
    fn new(max_listings: usize) -> Self {
        Self {
            cap: (max_listings > 0).then_some(max_listings),
            ..Self::default()
        }
    }

    fn is_full(&self) -> bool {
        self.cap.is_some_and(|cap| self.ordered.len() >= cap)
    }

    /// Returns `true` if `href` was new and has been appended.
    fn insert(&mut self, href: &str) -> bool {
        if self.is_full() || self.seen.contains(href) {
            return false;
        }
        self.seen.insert(href.to_string());
        self.ordered.push(href.to_string());
        true
    }
}

/// Collect unique listing references from the results view in `page`.
///
/// `max_listings == 0` means unlimited. Scroll and read failures skip the
/// affected step; discovery itself never fails.
pub async fn discover_listings<P: BrowsingPage + ?Sized>(
    page: &mut P,
    selectors: &SelectorSet,
    config: &DiscoveryConfig,
    max_listings: usize,
    cancel: &CancellationToken,
    progress: &mut dyn Progress,
) -> DiscoveryOutcome {
    let mut listings = ListingSet::new(max_listings);
    let mut state = DiscoveryState::Scrolling;
    let mut stale_rounds = 0_u32;
    let mut rounds = 0_u32;
    let mut pages_advanced = 0_u32;

    let end = loop {
        state = match state {
            DiscoveryState::Scrolling => {
                if cancel.is_cancelled() {
                    emit(
                        progress,
                        LogLevel::Warn,
                        "Stop requested while collecting listings.",
                    );
                    DiscoveryState::Done(DiscoveryEnd::Cancelled)
                } else {
                    rounds += 1;
                    scroll_results(page, selectors, config).await;
                    let added = collect_cards(page, selectors, &mut listings).await;
                    tracing::debug!(round = rounds, added, collected = listings.ordered.len(), "discovery round");

                    if listings.is_full() {
                        emit(
                            progress,
                            LogLevel::Ok,
                            &format!(
                                "Collected {} / {max_listings} listings. Stopping URL collection.",
                                listings.ordered.len()
                            ),
                        );
                        DiscoveryState::Done(DiscoveryEnd::LimitReached)
                    } else if added == 0 {
                        stale_rounds += 1;
                        emit(
                            progress,
                            LogLevel::Warn,
                            &format!("No new cards (round {stale_rounds})"),
                        );
                        if stale_rounds >= config.stale_round_limit {
                            DiscoveryState::Paginating
                        } else {
                            DiscoveryState::Scrolling
                        }
                    } else {
                        stale_rounds = 0;
                        DiscoveryState::Scrolling
                    }
                }
            }
            DiscoveryState::Paginating => {
                if next_results_page(page, selectors, config, progress).await {
                    pages_advanced += 1;
                    stale_rounds = 0;
                    DiscoveryState::Scrolling
                } else {
                    emit(
                        progress,
                        LogLevel::Warn,
                        "No more pages found. Ending URL collection.",
                    );
                    DiscoveryState::Done(DiscoveryEnd::Exhausted)
                }
            }
            DiscoveryState::Done(end) => break end,
        };
    };

    tracing::info!(
        collected = listings.ordered.len(),
        rounds,
        pages_advanced,
        ?end,
        "discovery finished"
    );

    DiscoveryOutcome {
        listings: listings.ordered,
        end,
        rounds,
        pages_advanced,
    }
}

/// Scroll the results panel, or the window if there is none, by
/// `scroll_increments` steps. A failed step is skipped.
async fn scroll_results<P: BrowsingPage + ?Sized>(
    page: &mut P,
    selectors: &SelectorSet,
    config: &DiscoveryConfig,
) {
    let has_panel = match page.count(&selectors.results_panel).await {
        Ok(n) => n > 0,
        Err(err) => {
            tracing::debug!(error = %err, "results panel lookup failed");
            false
        }
    };

    for step in 0..config.scroll_increments {
        let scrolled = if has_panel {
            page.evaluate_on(&selectors.results_panel, 0, SCROLL_ELEMENT_JS)
                .await
        } else {
            page.evaluate(SCROLL_WINDOW_JS).await
        };
        match scrolled {
            Ok(()) => page.wait(config.scroll_settle_ms).await,
            Err(err) => tracing::debug!(step, error = %err, "scroll step skipped"),
        }
    }
}

/// Append every unseen listing card reference. Returns how many were added.
async fn collect_cards<P: BrowsingPage + ?Sized>(
    page: &mut P,
    selectors: &SelectorSet,
    listings: &mut ListingSet,
) -> usize {
    let hrefs = match page.attributes(&selectors.listing_cards, "href").await {
        Ok(hrefs) => hrefs,
        Err(err) => {
            tracing::debug!(error = %err, "listing card hrefs read failed");
            return 0;
        }
    };

    let mut added = 0;
    for href in hrefs.iter().flatten() {
        if listings.is_full() {
            break;
        }
        let href = href.trim();
        if !href.is_empty() && listings.insert(href) {
            added += 1;
        }
    }
    added
}

/// Click the first enabled "next page" control and wait for listing cards
/// to reappear. Returns `false` when no variant worked.
async fn next_results_page<P: BrowsingPage + ?Sized>(
    page: &mut P,
    selectors: &SelectorSet,
    config: &DiscoveryConfig,
    progress: &mut dyn Progress,
) -> bool {
    let timeout = Duration::from_secs(config.pagination_timeout_secs);

    for selector in &selectors.next_page {
        let present = matches!(page.count(selector).await, Ok(n) if n > 0);
        if !present || !matches!(page.is_enabled(selector, 0).await, Ok(true)) {
            continue;
        }

        if let Err(err) = page.click(selector, 0).await {
            tracing::debug!(selector = %selector, error = %err, "next page click failed");
            continue;
        }
        emit(progress, LogLevel::Ok, "Clicked Next page…");
        page.wait(config.pagination_settle_ms).await;

        match page.wait_for_selector(&selectors.listing_ready, timeout).await {
            Ok(()) => return true,
            Err(err) => {
                tracing::warn!(selector = %selector, error = %err, "listings did not reappear after paginating");
            }
        }
    }
    false
}
