//! CSS selectors for the map listing markup.
//!
//! Results-page markup changes without notice, so every selector can be
//! overridden from a YAML file. Fields missing from the file keep their
//! built-in default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Business name heading on a listing page.
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: String,
    /// Element whose `aria-label` carries the star rating.
    pub rating: String,
    /// Element whose `aria-label` carries the review count.
    pub reviews: String,
    /// Link whose `href` is the business website.
    pub website: String,
    /// Button that expands the weekly hours table.
    pub hours_button: String,
    /// Hours table row selectors, tried in order until one matches.
    pub hours_rows: Vec<String>,
    /// Cell selector inside an hours row.
    pub hours_cells: String,
    /// Scrollable results container. The page itself is scrolled when absent.
    pub results_panel: String,
    /// Anchors whose `href` is a listing reference.
    pub listing_cards: String,
    /// "Next page" control variants, tried in order.
    pub next_page: Vec<String>,
    /// Probe that must match again after paginating.
    pub listing_ready: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            name: "div.TIHn2 h1.DUwDvf".to_string(),
            address: r#"button[data-item-id="address"] div.fontBodyMedium"#.to_string(),
            phone: r#"button[data-item-id^="phone:tel:"] div.fontBodyMedium"#.to_string(),
            category: "button.DkEaL".to_string(),
            rating: r#"div[role="img"][aria-label*="stars"]"#.to_string(),
            reviews: r#"span[aria-label*="reviews"]"#.to_string(),
            website: r#"a[data-item-id="authority"]"#.to_string(),
            hours_button: r#"button[data-item-id*="oh"]"#.to_string(),
            hours_rows: vec!["table tr".to_string(), "div.G8aQO tr".to_string()],
            hours_cells: "td".to_string(),
            results_panel: r#"div[aria-label*="Results for"], div[role="feed"]"#.to_string(),
            listing_cards: r#"a[href*="/maps/place/"]"#.to_string(),
            next_page: vec![
                r#"button[aria-label=" Next page "], button[aria-label="Next page"]"#.to_string(),
                r#"button.HlvSq[aria-label*="Next"]"#.to_string(),
                r#"div[jsaction*="pane.paginationSection.nextPage"] button"#.to_string(),
                r#"button[data-id*="pagination-button-next"]"#.to_string(),
            ],
            listing_ready: r#"a[href*="https://www.google.com/maps/place"]"#.to_string(),
        }
    }
}

/// Load a selector set from a YAML file and validate it.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or contains a
/// blank selector.
pub fn load_selectors(path: &Path) -> Result<SelectorSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SelectorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_selectors(&content)
}

/// Parse and validate a selector set from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or a selector is blank.
pub fn parse_selectors(yaml: &str) -> Result<SelectorSet, ConfigError> {
    let selectors: SelectorSet = serde_yaml::from_str(yaml)?;
    validate_selectors(&selectors)?;
    Ok(selectors)
}

fn validate_selectors(selectors: &SelectorSet) -> Result<(), ConfigError> {
    let single = [
        ("name", &selectors.name),
        ("address", &selectors.address),
        ("phone", &selectors.phone),
        ("category", &selectors.category),
        ("rating", &selectors.rating),
        ("reviews", &selectors.reviews),
        ("website", &selectors.website),
        ("hours_button", &selectors.hours_button),
        ("hours_cells", &selectors.hours_cells),
        ("results_panel", &selectors.results_panel),
        ("listing_cards", &selectors.listing_cards),
        ("listing_ready", &selectors.listing_ready),
    ];
    for (field, value) in single {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector '{field}' must be non-empty"
            )));
        }
    }

    for (field, list) in [
        ("hours_rows", &selectors.hours_rows),
        ("next_page", &selectors.next_page),
    ] {
        if list.is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector list '{field}' must have at least one entry"
            )));
        }
        if list.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "selector list '{field}' contains a blank entry"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(validate_selectors(&SelectorSet::default()).is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_fields() {
        let yaml = r#"
name: "h1.title"
next_page:
  - "button.next"
"#;
        let selectors = parse_selectors(yaml).expect("valid yaml");
        assert_eq!(selectors.name, "h1.title");
        assert_eq!(selectors.next_page, vec!["button.next".to_string()]);
        assert_eq!(selectors.address, SelectorSet::default().address);
        assert_eq!(selectors.hours_rows.len(), 2);
    }

    #[test]
    fn blank_selector_is_rejected() {
        let err = parse_selectors("phone: \"  \"\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("phone")),
            "expected validation error naming phone, got: {err:?}"
        );
    }

    #[test]
    fn empty_fallback_list_is_rejected() {
        let err = parse_selectors("hours_rows: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_selectors("name: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::SelectorsFileParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_selectors(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::SelectorsFileIo { .. }));
    }
}
