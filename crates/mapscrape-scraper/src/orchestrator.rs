//! Drives one scrape run: resolve the target, discover listings, extract
//! each one in discovery order.

use std::sync::LazyLock;

use mapscrape_core::{DiscoveryConfig, Record, SelectorSet};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::browser::BrowsingPage;
use crate::discovery::{discover_listings, DiscoveryEnd};
use crate::error::ScraperError;
use crate::extract::{extract_record, ListingRef};
use crate::progress::{emit, LogLevel, Progress};
use crate::social::SocialSniffer;

/// Base of the search URL built for free-text queries.
pub const SEARCH_URL_BASE: &str = "https://www.google.com/maps/search/";

/// Title used when a search URL names no query.
pub const FALLBACK_TITLE: &str = "google_maps_results";

/// Characters left unescaped in a free-text query path segment.
const QUERY_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

static SEARCH_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/maps/search/([^/?]+)").expect("valid regex"));

static UNSAFE_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid regex"));

/// Where a run starts and what its export should be called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub url: String,
    /// Human-readable query the output name is derived from.
    pub title: String,
    /// Suggested export file name, always ending in `.csv`.
    pub output_file: String,
}

/// Replace runs of characters outside `[A-Za-z0-9_-]` with `_` and trim
/// underscores. Returns `"results"` when nothing is left.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let safe = UNSAFE_FILENAME_RE.replace_all(name, "_");
    let safe = safe.trim_matches('_');
    if safe.is_empty() {
        "results".to_string()
    } else {
        safe.to_string()
    }
}

fn looks_like_url(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn title_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some((_, q)) = parsed.query_pairs().find(|(key, _)| key == "q") {
            return q.into_owned();
        }
    }
    SEARCH_SEGMENT_RE
        .captures(url)
        .map(|caps| percent_decode_str(&caps[1]).decode_utf8_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// Resolve a free-text query or a full URL into a [`SearchTarget`].
///
/// # Errors
///
/// Returns [`ScraperError::InvalidInput`] for blank input.
pub fn resolve_target(input: &str) -> Result<SearchTarget, ScraperError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ScraperError::InvalidInput(
            "query or URL must be non-empty".to_string(),
        ));
    }

    let (url, title) = if looks_like_url(input) {
        (input.to_string(), title_from_url(input))
    } else {
        (
            format!("{SEARCH_URL_BASE}{}", utf8_percent_encode(input, QUERY_PATH)),
            input.to_string(),
        )
    };

    let output_file = format!("{}.csv", sanitize_filename(&title));
    Ok(SearchTarget {
        url,
        title,
        output_file,
    })
}

/// Append-only result sequence for one run. Every push republishes the
/// whole sequence to subscribers.
#[derive(Debug)]
pub struct ResultAccumulator {
    records: Vec<Record>,
    tx: watch::Sender<Vec<Record>>,
}

impl Default for ResultAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAccumulator {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            records: Vec::new(),
            tx,
        }
    }

    /// Receiver of the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Record>> {
        self.tx.subscribe()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
        self.tx.send_replace(self.records.clone());
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Inputs a front-end supplies for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Free-text query or full search URL.
    pub input: String,
    /// `0` means unlimited.
    pub max_listings: usize,
    /// Delay after opening each listing before extracting it.
    pub listing_settle_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// The cancellation token fired; records hold everything finished first.
    Stopped,
    /// A fatal failure ended the run; records hold everything finished first.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub records: Vec<Record>,
    pub output_file: String,
    pub status: RunStatus,
    /// `None` when the run failed before discovery.
    pub discovery_end: Option<DiscoveryEnd>,
}

/// Sequential scrape driver. One logical worker owns the browsing page for
/// the whole run.
#[derive(Debug, Clone)]
pub struct ScrapeOrchestrator {
    selectors: SelectorSet,
    discovery: DiscoveryConfig,
    sniffer: Option<SocialSniffer>,
    cancel: CancellationToken,
}

impl ScrapeOrchestrator {
    #[must_use]
    pub fn new(selectors: SelectorSet, discovery: DiscoveryConfig) -> Self {
        Self {
            selectors,
            discovery,
            sniffer: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Enrich records with social links from each business website.
    #[must_use]
    pub fn with_sniffer(mut self, sniffer: SocialSniffer) -> Self {
        self.sniffer = Some(sniffer);
        self
    }

    /// Use `cancel` as the cooperative stop signal.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one scrape. Records finished before a stop or a fatal failure
    /// are kept in the outcome and in `results`.
    ///
    /// A stop during discovery ends collection, and every listing collected
    /// so far is still extracted. During extraction the stop is checked
    /// after each listing.
    pub async fn run<P: BrowsingPage + ?Sized>(
        &self,
        page: &mut P,
        request: &RunRequest,
        progress: &mut dyn Progress,
        results: &mut ResultAccumulator,
    ) -> RunOutcome {
        let target = match resolve_target(&request.input) {
            Ok(target) => target,
            Err(err) => {
                let output_file = format!("{}.csv", sanitize_filename(""));
                return failed_outcome(progress, results, output_file, None, &err.to_string());
            }
        };
        tracing::info!(url = %target.url, output = %target.output_file, "starting scrape run");

        emit(progress, LogLevel::Ok, &format!("Opening {}", target.url));
        if let Err(err) = page.navigate(&target.url).await {
            return failed_outcome(progress, results, target.output_file, None, &err.to_string());
        }
        page.wait(self.discovery.initial_settle_ms).await;

        let discovered = discover_listings(
            page,
            &self.selectors,
            &self.discovery,
            request.max_listings,
            &self.cancel,
            progress,
        )
        .await;
        let end = Some(discovered.end);
        // A stop seen by discovery only cuts collection short; the collected
        // listings are still extracted.
        let stop_consumed = discovered.end == DiscoveryEnd::Cancelled;
        if stop_consumed {
            emit(
                progress,
                LogLevel::Warn,
                &format!(
                    "Proceeding to scrape {} collected listings.",
                    discovered.listings.len()
                ),
            );
        }

        let cap = if request.max_listings > 0 {
            request.max_listings
        } else {
            usize::MAX
        };
        let listings: Vec<&String> = discovered.listings.iter().take(cap).collect();

        progress.begin(listings.len());
        emit(
            progress,
            LogLevel::Ok,
            &format!("Start Data Scraping ({} listings)", listings.len()),
        );

        let mut status = RunStatus::Completed;
        for (offset, url) in listings.into_iter().enumerate() {
            let s_no = offset + 1;
            if let Err(err) = page.navigate(url).await {
                let message = format!("Failed to open listing {s_no}: {err}");
                return failed_outcome(progress, results, target.output_file, end, &message);
            }
            page.wait(request.listing_settle_ms).await;

            let record = extract_record(
                page,
                &self.selectors,
                self.sniffer.as_ref(),
                ListingRef {
                    s_no,
                    url,
                    source: &request.input,
                },
            )
            .await;

            let name = record.name.clone();
            results.push(record);
            if let Some(record) = results.records().last() {
                progress.item_done(record);
            }
            emit(progress, LogLevel::Ok, &format!("Scraped {s_no}: {name}"));

            if !stop_consumed && self.cancel.is_cancelled() {
                emit(progress, LogLevel::Warn, "Stop requested. Keeping scraped listings.");
                status = RunStatus::Stopped;
                break;
            }
        }

        if stop_consumed {
            status = RunStatus::Stopped;
        }

        tracing::info!(records = results.records().len(), ?status, "scrape run finished");
        progress.finish();
        RunOutcome {
            records: results.records().to_vec(),
            output_file: target.output_file,
            status,
            discovery_end: end,
        }
    }
}

fn failed_outcome(
    progress: &mut dyn Progress,
    results: &ResultAccumulator,
    output_file: String,
    discovery_end: Option<DiscoveryEnd>,
    message: &str,
) -> RunOutcome {
    tracing::error!(error = %message, records = results.records().len(), "scrape run failed");
    progress.log(LogLevel::Err, message);
    progress.finish();
    RunOutcome {
        records: results.records().to_vec(),
        output_file,
        status: RunStatus::Failed(message.to_string()),
        discovery_end,
    }
}
