use std::sync::LazyLock;

use mapscrape_core::{SelectorSet, WeekHours, PLACEHOLDER};
use regex::Regex;

use crate::browser::{try_click, BrowsingPage};

/// Delay after opening the hours widget before reading its table.
const HOURS_WIDGET_SETTLE_MS: u64 = 500;

static RANGE_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)–|-|\bto\b").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

type DaySlot = fn(&mut WeekHours) -> &mut String;

/// Day-label prefixes and the field each one fills, checked in order.
static DAY_SLOTS: [(&str, DaySlot); 7] = [
    ("mon", |h| &mut h.monday_hours),
    ("tue", |h| &mut h.tuesday_hours),
    ("wed", |h| &mut h.wednesday_hours),
    ("thu", |h| &mut h.thursday_hours),
    ("fri", |h| &mut h.friday_hours),
    ("sat", |h| &mut h.saturday_hours),
    ("sun", |h| &mut h.sunday_hours),
];

/// Canonical form of one day's hours text.
///
/// Returns `"Open 24 hours"`, `"Closed"`, `"<open> to <close>"`, a single
/// bare time when only one side is present, or [`PLACEHOLDER`].
#[must_use]
pub fn normalize_hours_text(raw: &str) -> String {
    let text = WHITESPACE_RE.replace_all(raw.trim(), " ");
    let lower = text.to_lowercase();

    if lower.contains("24") && lower.contains("hour") {
        return "Open 24 hours".to_string();
    }
    if lower.contains("closed") {
        return "Closed".to_string();
    }

    let mut times = RANGE_SEPARATOR_RE.split(&text).map(str::trim);
    let open = times.next().unwrap_or_default();
    let close = times.next().unwrap_or_default();

    match (open.is_empty(), close.is_empty()) {
        (false, false) => format!("{open} to {close}"),
        (false, true) => open.to_string(),
        (true, false) => close.to_string(),
        (true, true) => PLACEHOLDER.to_string(),
    }
}

/// Fill a [`WeekHours`] from `(day label, hours text)` rows.
///
/// Rows whose label matches no day prefix are skipped, as are rows with
/// fewer than two cells. Days without a row stay at [`PLACEHOLDER`].
#[must_use]
pub fn week_hours_from_rows(rows: &[Vec<String>]) -> WeekHours {
    let mut hours = WeekHours::unknown();
    for row in rows {
        let [label, text, ..] = row.as_slice() else {
            continue;
        };
        let label = label.to_lowercase();
        if let Some((_, slot)) = DAY_SLOTS.iter().find(|(key, _)| label.contains(key)) {
            *slot(&mut hours) = normalize_hours_text(text);
        }
    }
    hours
}

/// Read the weekly hours from the current listing view.
///
/// Opens the hours widget if a button for it exists, then reads the first
/// row selector that yields rows. A missing widget or a failed read leaves
/// every day at [`PLACEHOLDER`].
pub async fn parse_weekly_hours<P: BrowsingPage + ?Sized>(
    page: &mut P,
    selectors: &SelectorSet,
) -> WeekHours {
    if try_click(page, &selectors.hours_button).await {
        page.wait(HOURS_WIDGET_SETTLE_MS).await;
    }

    for row_selector in &selectors.hours_rows {
        match page.row_cells(row_selector, &selectors.hours_cells).await {
            Ok(rows) if !rows.is_empty() => return week_hours_from_rows(&rows),
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(selector = %row_selector, error = %err, "hours table read failed");
            }
        }
    }

    WeekHours::unknown()
}
