use std::sync::LazyLock;

use mapscrape_core::{Record, SelectorSet, PLACEHOLDER};
use regex::Regex;

use crate::browser::{read_attribute, read_text, BrowsingPage};
use crate::parse::{parse_address_parts, parse_coordinates, parse_weekly_hours};
use crate::social::{merge_social_links, normalize_website_url, SocialSniffer};

static FLOAT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));

static COUNT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("valid regex"));

/// Identity of the listing being extracted.
#[derive(Debug, Clone, Copy)]
pub struct ListingRef<'a> {
    /// 1-based position in discovery order.
    pub s_no: usize,
    /// Listing reference URL; coordinates are read from this, not from the
    /// page's current URL.
    pub url: &'a str,
    /// User query or URL that started the run.
    pub source: &'a str,
}

/// First decimal number in a label such as `"4.6 stars "`.
#[must_use]
pub fn parse_rating(label: &str) -> Option<f64> {
    FLOAT_TOKEN_RE.find(label)?.as_str().parse().ok()
}

/// First integer in a label such as `"1,284 reviews"`, separators removed.
#[must_use]
pub fn parse_review_count(label: &str) -> Option<u64> {
    COUNT_TOKEN_RE
        .find(label)?
        .as_str()
        .replace(',', "")
        .parse()
        .ok()
}

/// Build a normalized [`Record`] from the listing view currently loaded in
/// `page`.
///
/// Every field lookup is best-effort: a missing element or failed read
/// leaves that field blank, and blanks become [`PLACEHOLDER`] in the final
/// normalization pass. Website enrichment runs only when `sniffer` is
/// provided and a website was found.
pub async fn extract_record<P: BrowsingPage + ?Sized>(
    page: &mut P,
    selectors: &SelectorSet,
    sniffer: Option<&SocialSniffer>,
    listing: ListingRef<'_>,
) -> Record {
    let mut record = Record::new(listing.s_no, listing.source, listing.url);

    record.name = read_text(page, &selectors.name).await.unwrap_or_default();
    record.address = read_text(page, &selectors.address).await.unwrap_or_default();
    record.website = read_attribute(page, &selectors.website, "href")
        .await
        .map(|href| normalize_website_url(&href))
        .unwrap_or_default();
    record.phone_number = read_text(page, &selectors.phone).await.unwrap_or_default();

    record.reviews_average = read_attribute(page, &selectors.rating, "aria-label")
        .await
        .as_deref()
        .and_then(parse_rating);
    record.reviews_count = read_attribute(page, &selectors.reviews, "aria-label")
        .await
        .as_deref()
        .and_then(parse_review_count);
    record.category = read_text(page, &selectors.category).await.unwrap_or_default();

    (record.latitude, record.longitude) = parse_coordinates(listing.url);

    (record.city, record.zip_code, record.country) = if record.address.is_empty() {
        (
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
        )
    } else {
        parse_address_parts(&record.address)
    };

    record.hours = parse_weekly_hours(page, selectors).await;

    if let Some(sniffer) = sniffer {
        if !record.website.is_empty() {
            let found = sniffer.sniff(&record.website).await;
            merge_social_links(&mut record.social, found);
        }
    }

    record.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_takes_first_decimal() {
        assert_eq!(parse_rating("4.6 stars "), Some(4.6));
        assert_eq!(parse_rating("Rated 5 stars"), Some(5.0));
        assert_eq!(parse_rating("stars"), None);
    }

    #[test]
    fn review_count_strips_separators() {
        assert_eq!(parse_review_count("1,284 reviews"), Some(1284));
        assert_eq!(parse_review_count("(37)"), Some(37));
        assert_eq!(parse_review_count("No reviews"), None);
    }
}
