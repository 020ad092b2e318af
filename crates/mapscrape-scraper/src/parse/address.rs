use std::sync::LazyLock;

use mapscrape_core::PLACEHOLDER;
use regex::Regex;

/// UK-style alphanumeric postcode (`SW1A 1AA`) or a 4-6 digit numeric code.
static POSTAL_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z]{1,2}\d[A-Z0-9]?\s?\d[A-Z]{2}|\d{4,6})\b").expect("valid regex")
});

/// Split a free-text address into `(city, zip_code, country)`.
///
/// Non-ASCII characters are dropped before splitting on commas. When the last
/// segment has no digit it is taken as the country and the segment before it
/// as the city/zip blob; otherwise the last segment is the blob and the
/// country is unknown. Unknown parts come back as [`PLACEHOLDER`].
///
/// ```
/// use mapscrape_scraper::parse::parse_address_parts;
///
/// let (city, zip, country) = parse_address_parts("12 High St, London SW1A 1AA, United Kingdom");
/// assert_eq!(city, "London");
/// assert_eq!(zip, "SW1A 1AA");
/// assert_eq!(country, "United Kingdom");
/// ```
#[must_use]
pub fn parse_address_parts(raw: &str) -> (String, String, String) {
    let ascii: String = raw.chars().filter(char::is_ascii).collect();
    let parts: Vec<&str> = ascii
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let (blob, country) = match parts.as_slice() {
        [] => ("", ""),
        [only] => (*only, ""),
        [.., second_last, last] if !last.chars().any(|c| c.is_ascii_digit()) => {
            (*second_last, *last)
        }
        [.., last] => (*last, ""),
    };

    let (city, zip) = match POSTAL_CODE_RE.find(blob) {
        Some(m) => {
            let zip = m.as_str().trim().to_string();
            let city = blob.replace(m.as_str(), "");
            let city = city.trim_matches(|c: char| c == ',' || c.is_whitespace());
            (city.to_string(), zip)
        }
        None => (blob.to_string(), String::new()),
    };

    (or_placeholder(city), or_placeholder(zip), or_placeholder(country.to_string()))
}

fn or_placeholder(value: String) -> String {
    if value.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value
    }
}
