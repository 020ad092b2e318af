pub mod app_config;
pub mod config;
pub mod record;
pub mod selectors;

pub use app_config::{AppConfig, DiscoveryConfig, DEFAULT_USER_AGENT};
pub use config::{load_app_config, load_app_config_from_env};
pub use record::{Record, SocialLinks, WeekHours, PLACEHOLDER};
pub use selectors::{load_selectors, SelectorSet};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read selectors file {path}: {source}")]
    SelectorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse selectors file: {0}")]
    SelectorsFileParse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
