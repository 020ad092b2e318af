use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn empty_env_uses_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let config = build_app_config(lookup_from_map(&map)).expect("defaults are valid");

    assert_eq!(config.log_level, "info");
    assert_eq!(config.request_timeout_secs, 10);
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(config.selectors_path, None);
    assert_eq!(config.output_dir, PathBuf::from("."));
    assert_eq!(config.chrome_path, None);
    assert_eq!(config.discovery, DiscoveryConfig::default());
}

#[test]
fn discovery_defaults_match_listing_feed_behaviour() {
    let defaults = DiscoveryConfig::default();
    assert_eq!(defaults.scroll_increments, 3);
    assert_eq!(defaults.scroll_settle_ms, 1000);
    assert_eq!(defaults.stale_round_limit, 5);
    assert_eq!(defaults.pagination_timeout_secs, 30);
}

#[test]
fn overrides_are_applied() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("MAPSCRAPE_LOG_LEVEL", "debug");
    map.insert("MAPSCRAPE_REQUEST_TIMEOUT_SECS", "4");
    map.insert("MAPSCRAPE_SELECTORS_PATH", "./config/selectors.yaml");
    map.insert("MAPSCRAPE_OUTPUT_DIR", "/tmp/out");
    map.insert("MAPSCRAPE_SCROLL_INCREMENTS", "2");
    map.insert("MAPSCRAPE_SCROLL_SETTLE_MS", "250");
    map.insert("MAPSCRAPE_STALE_ROUND_LIMIT", "7");
    map.insert("MAPSCRAPE_PAGINATION_TIMEOUT_SECS", "12");
    map.insert("MAPSCRAPE_INITIAL_SETTLE_MS", "0");

    let config = build_app_config(lookup_from_map(&map)).expect("valid overrides");

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.request_timeout_secs, 4);
    assert_eq!(
        config.selectors_path,
        Some(PathBuf::from("./config/selectors.yaml"))
    );
    assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    assert_eq!(config.discovery.scroll_increments, 2);
    assert_eq!(config.discovery.scroll_settle_ms, 250);
    assert_eq!(config.discovery.stale_round_limit, 7);
    assert_eq!(config.discovery.pagination_timeout_secs, 12);
    assert_eq!(config.discovery.initial_settle_ms, 0);
}

#[test]
fn blank_optional_path_is_treated_as_unset() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("MAPSCRAPE_CHROME_PATH", "   ");
    let config = build_app_config(lookup_from_map(&map)).expect("valid");
    assert_eq!(config.chrome_path, None);
}

#[test]
fn non_numeric_timeout_is_rejected() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("MAPSCRAPE_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MAPSCRAPE_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar, got: {result:?}"
    );
}

#[test]
fn zero_stale_round_limit_is_rejected() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("MAPSCRAPE_STALE_ROUND_LIMIT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn zero_scroll_increments_is_rejected() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("MAPSCRAPE_SCROLL_INCREMENTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}
