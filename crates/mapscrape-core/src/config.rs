use std::path::PathBuf;

use crate::app_config::{AppConfig, DiscoveryConfig, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; absent variables take their default.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let defaults = DiscoveryConfig::default();

    let log_level = or_default("MAPSCRAPE_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("MAPSCRAPE_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("MAPSCRAPE_USER_AGENT", DEFAULT_USER_AGENT);
    let selectors_path = optional_path("MAPSCRAPE_SELECTORS_PATH");
    let output_dir = PathBuf::from(or_default("MAPSCRAPE_OUTPUT_DIR", "."));
    let chrome_path = optional_path("MAPSCRAPE_CHROME_PATH");

    let discovery = DiscoveryConfig {
        scroll_increments: parse_u32(
            "MAPSCRAPE_SCROLL_INCREMENTS",
            &defaults.scroll_increments.to_string(),
        )?,
        scroll_settle_ms: parse_u64(
            "MAPSCRAPE_SCROLL_SETTLE_MS",
            &defaults.scroll_settle_ms.to_string(),
        )?,
        stale_round_limit: parse_u32(
            "MAPSCRAPE_STALE_ROUND_LIMIT",
            &defaults.stale_round_limit.to_string(),
        )?,
        pagination_timeout_secs: parse_u64(
            "MAPSCRAPE_PAGINATION_TIMEOUT_SECS",
            &defaults.pagination_timeout_secs.to_string(),
        )?,
        pagination_settle_ms: defaults.pagination_settle_ms,
        initial_settle_ms: parse_u64(
            "MAPSCRAPE_INITIAL_SETTLE_MS",
            &defaults.initial_settle_ms.to_string(),
        )?,
    };

    if discovery.scroll_increments == 0 {
        return Err(ConfigError::Validation(
            "MAPSCRAPE_SCROLL_INCREMENTS must be at least 1".to_string(),
        ));
    }
    if discovery.stale_round_limit == 0 {
        return Err(ConfigError::Validation(
            "MAPSCRAPE_STALE_ROUND_LIMIT must be at least 1".to_string(),
        ));
    }
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "MAPSCRAPE_USER_AGENT must be non-empty".to_string(),
        ));
    }

    Ok(AppConfig {
        log_level,
        request_timeout_secs,
        user_agent,
        selectors_path,
        output_dir,
        chrome_path,
        discovery,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
