use std::sync::LazyLock;

use regex::Regex;

static AT_COORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([0-9.-]+),([0-9.-]+)").expect("valid regex"));

static DATA_COORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!3d([-0-9.]+)!4d([-0-9.]+)").expect("valid regex"));

/// Latitude and longitude embedded in a listing URL.
///
/// Looks for `@lat,lng` first, then the `!3d<lat>!4d<lng>` data segment.
/// Returns `(0.0, 0.0)` when neither is present or the first match does not
/// parse.
#[must_use]
pub fn parse_coordinates(url: &str) -> (f64, f64) {
    let captures = AT_COORDS_RE
        .captures(url)
        .or_else(|| DATA_COORDS_RE.captures(url));

    let Some(caps) = captures else {
        return (0.0, 0.0);
    };

    match (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
        (Ok(lat), Ok(lng)) => (lat, lng),
        _ => (0.0, 0.0),
    }
}
