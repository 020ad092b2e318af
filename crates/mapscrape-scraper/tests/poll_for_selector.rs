//! `poll_for_selector` against a page whose lookups fail intermittently.

use std::time::Duration;

use mapscrape_scraper::browser::poll_for_selector;
use mapscrape_scraper::testing::{FakePage, FakeView};
use mapscrape_scraper::{BrowserError, BrowsingPage};

const URL: &str = "https://www.google.com/maps/search/bakeries";
const READY: &str = "a.listing";

async fn page_with_listing() -> FakePage {
    let mut page = FakePage::new().with_view(URL, FakeView::new().text(READY, "Bakery 1"));
    page.navigate(URL).await.expect("fake navigation succeeds");
    page
}

#[tokio::test]
async fn transient_lookup_errors_keep_polling() {
    let mut page = page_with_listing().await.flaky_count(READY, 3);

    let result = poll_for_selector(
        &mut page,
        READY,
        Duration::from_secs(5),
        Duration::from_millis(1),
    )
    .await;

    assert!(result.is_ok(), "unexpected {result:?}");
}

#[tokio::test]
async fn persistent_lookup_errors_end_in_timeout() {
    let mut page = page_with_listing().await.flaky_count(READY, usize::MAX);

    let result = poll_for_selector(
        &mut page,
        READY,
        Duration::from_millis(30),
        Duration::from_millis(5),
    )
    .await;

    assert!(matches!(
        result,
        Err(BrowserError::Timeout { ref selector, timeout_ms: 30 }) if selector == READY
    ));
}

#[tokio::test]
async fn missing_selector_times_out() {
    let mut page = page_with_listing().await;

    let result = poll_for_selector(
        &mut page,
        "div.never",
        Duration::from_millis(20),
        Duration::from_millis(5),
    )
    .await;

    assert!(matches!(result, Err(BrowserError::Timeout { .. })));
}
