//! Shell state
use hashroute_core::{Result, Router, Settings};

/// State shared by every shell command
pub struct AppState {
    router: Router,
}

impl AppState {
    pub fn new() -> Result<Self> {
        Self::with_settings(Settings::from_env_or_default()?)
    }

    pub fn with_settings(settings: Settings) -> Result<Self> {
        Ok(Self {
            router: Router::new(settings)?,
        })
    }

    /// Start routing. Returns whether the start location was routed.
    pub fn initialize(&self) -> Result<bool> {
        self.router.start()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}
