use thiserror::Error;

/// Failures reported by a browsing backend.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element lookup for \"{selector}\" failed: {reason}")]
    Element { selector: String, reason: String },

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("timed out after {timeout_ms}ms waiting for \"{selector}\"")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("unsupported browser operation: {0}")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
