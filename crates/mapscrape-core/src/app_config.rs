use std::path::PathBuf;

/// Browser-like user agent used for website enrichment requests.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub selectors_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub chrome_path: Option<PathBuf>,
    pub discovery: DiscoveryConfig,
}

/// Timing and threshold knobs for the listing discovery loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Scroll increments per discovery round.
    pub scroll_increments: u32,
    /// Delay after each scroll increment.
    pub scroll_settle_ms: u64,
    /// Consecutive rounds without new listings before paginating.
    pub stale_round_limit: u32,
    /// Upper bound on waiting for listings after clicking "next page".
    pub pagination_timeout_secs: u64,
    /// Delay after clicking "next page" before probing for listings.
    pub pagination_settle_ms: u64,
    /// Delay after the first navigation to the search URL.
    pub initial_settle_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            scroll_increments: 3,
            scroll_settle_ms: 1000,
            stale_round_limit: 5,
            pagination_timeout_secs: 30,
            pagination_settle_ms: 1500,
            initial_settle_ms: 1500,
        }
    }
}
