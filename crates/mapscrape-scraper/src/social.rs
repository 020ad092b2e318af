use std::sync::LazyLock;
use std::time::Duration;

use mapscrape_core::SocialLinks;
use regex::Regex;
use reqwest::{Client, StatusCode};

use crate::error::ScraperError;

static INSTAGRAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?instagram\.com/[A-Za-z0-9_.\-/%?=&]+").expect("valid regex")
});

static FACEBOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?facebook\.com/[A-Za-z0-9_.\-/%?=&]+").expect("valid regex")
});

static LINKEDIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[a-z]{2,3}\.)?linkedin\.com/[A-Za-z0-9_.\-/%?=&]+")
        .expect("valid regex")
});

static X_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:twitter|x)\.com/[A-Za-z0-9_.\-/%?=&]+")
        .expect("valid regex")
});

/// Prefix a scheme onto a website link that lacks one.
///
/// `//host/path` becomes `https://host/path` and `host/path` becomes
/// `https://host/path`. Links that already carry `http://` or `https://`
/// are returned unchanged.
#[must_use]
pub fn normalize_website_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }
    format!("https://{}", raw.trim_start_matches('/'))
}

/// First profile link of each network found in `html`. Networks without a
/// link are left empty.
#[must_use]
pub fn find_social_links(html: &str) -> SocialLinks {
    let first = |re: &Regex| re.find(html).map(|m| m.as_str().to_string()).unwrap_or_default();
    SocialLinks {
        instagram_url: first(&INSTAGRAM_RE),
        facebook_url: first(&FACEBOOK_RE),
        linkedin_url: first(&LINKEDIN_RE),
        x_url: first(&X_RE),
    }
}

/// Best-effort social profile discovery from a business homepage.
///
/// One GET per website with a short timeout. Anything other than a `200`
/// response yields no links; failures are logged at debug and never
/// surfaced to the caller.
#[derive(Debug, Clone)]
pub struct SocialSniffer {
    client: Client,
}

impl SocialSniffer {
    /// Creates a sniffer whose requests time out after `timeout_secs` and
    /// carry `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch `website` and scan the body for social profile links.
    ///
    /// Returns empty links for a blank `website`, a non-200 response, or
    /// any transport error.
    pub async fn sniff(&self, website: &str) -> SocialLinks {
        let url = normalize_website_url(website);
        if url.is_empty() {
            return SocialLinks::default();
        }

        match self.fetch(&url).await {
            Ok(Some(body)) => find_social_links(&body),
            Ok(None) => SocialLinks::default(),
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "social sniffing request failed");
                SocialLinks::default()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Option<String>, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(url, status = status.as_u16(), "social sniffing skipped non-200 response");
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }
}

/// Copy every non-empty link from `found` into `target`.
pub fn merge_social_links(target: &mut SocialLinks, found: SocialLinks) {
    let pairs = [
        (&mut target.instagram_url, found.instagram_url),
        (&mut target.facebook_url, found.facebook_url),
        (&mut target.linkedin_url, found.linkedin_url),
        (&mut target.x_url, found.x_url),
    ];
    for (slot, value) in pairs {
        if !value.is_empty() {
            *slot = value;
        }
    }
}
