pub mod browser;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod parse;
pub mod progress;
pub mod social;
pub mod testing;

pub use browser::BrowsingPage;
pub use discovery::{discover_listings, DiscoveryEnd, DiscoveryOutcome};
pub use error::{BrowserError, ScraperError};
pub use extract::{extract_record, ListingRef};
pub use orchestrator::{
    resolve_target, sanitize_filename, ResultAccumulator, RunOutcome, RunRequest, RunStatus,
    ScrapeOrchestrator, SearchTarget,
};
pub use progress::{LogLevel, NullProgress, Progress};
pub use social::SocialSniffer;

#[cfg(feature = "chrome")]
pub use browser::{ChromeOptions, ChromePage};
