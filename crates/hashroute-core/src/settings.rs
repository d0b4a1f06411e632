//! Router settings

use serde::{Deserialize, Serialize};
use std::path::Path;

use hashroute_history::CoordinatorOptions;

use crate::error::CoreError;
use crate::Result;

/// Environment variable naming a JSON settings file
pub const CONFIG_ENV: &str = "HASHROUTE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application root path
    pub root: String,
    /// Skip the route handler on startup
    pub silent: bool,
    /// URL the host opens at
    pub start_url: String,
    /// Initial document title
    pub title: String,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;

        tracing::debug!(path = %path.as_ref().display(), "Loaded settings");

        Ok(settings)
    }

    /// Settings from the file named by `HASHROUTE_CONFIG`, or the defaults
    pub fn from_env_or_default() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.root.contains(['#', '?']) {
            return Err(CoreError::Config(format!(
                "root must be a plain path: {}",
                self.root
            )));
        }
        if self.start_url.trim().is_empty() {
            return Err(CoreError::Config("start_url cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Options layer for the history coordinator (no route handler)
    pub fn to_options(&self) -> CoordinatorOptions {
        CoordinatorOptions::new()
            .with_root(self.root.clone())
            .with_silent(self.silent)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            silent: false,
            start_url: "http://localhost/".to_string(),
            title: String::new(),
        }
    }
}
