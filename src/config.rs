//! Runtime configuration.
//!
//! Sources, lowest to highest precedence:
//! - built-in defaults
//! - environment (a `.env` file is loaded first if present)
//! - CLI flags

use std::path::PathBuf;

use log::debug;

/// Default model artifact, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "model_pipeline.json";

pub const ENV_MODEL_PATH: &str = "HPP_MODEL_PATH";
pub const ENV_LOCATIONS_PATH: &str = "HPP_LOCATIONS_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    /// JSON array of location names; `None` uses the built-in list.
    pub locations_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            locations_path: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment (and `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(path) = non_empty(ENV_MODEL_PATH) {
            config.model_path = PathBuf::from(path);
        }
        config.locations_path = non_empty(ENV_LOCATIONS_PATH).map(PathBuf::from);
        debug!("config: {config:?}");
        config
    }

    /// Apply CLI overrides on top of this configuration.
    pub fn with_overrides(mut self, model: Option<PathBuf>, locations: Option<PathBuf>) -> Self {
        if let Some(path) = model {
            self.model_path = path;
        }
        if locations.is_some() {
            self.locations_path = locations;
        }
        self
    }
}
