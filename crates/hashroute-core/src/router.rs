//! Router
//!
//! Owns the host environment and the history coordinator for one
//! application. The route handler installed on start records each genuine
//! state transition as a [`Visit`].

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use hashroute_history::{CanonicalState, HistoryCoordinator, NavigateOptions};
use hashroute_host::MemoryHost;

use crate::settings::Settings;
use crate::Result;

/// One route-handler invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub state_string: String,
    pub visited_at: DateTime<Utc>,
}

pub struct Router {
    settings: Settings,
    host: Arc<MemoryHost>,
    coordinator: HistoryCoordinator<MemoryHost>,
    visits: Arc<RwLock<Vec<Visit>>>,
}

impl Router {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let host = Arc::new(MemoryHost::new(&settings.start_url)?);
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        coordinator.set_title(&settings.title);

        Ok(Self {
            settings,
            host,
            coordinator,
            visits: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Activate the coordinator. Returns whether the current location was
    /// routed.
    pub fn start(&self) -> Result<bool> {
        let visits = Arc::clone(&self.visits);
        let options = self
            .settings
            .to_options()
            .with_route_handler(move |state_string| {
                tracing::info!(state = %state_string, "Route");
                visits.write().push(Visit {
                    state_string: state_string.to_string(),
                    visited_at: Utc::now(),
                });
                Ok(true)
            });

        let routed = self.coordinator.activate(options)?;

        tracing::info!(
            url = %self.host.current_url(),
            root = %self.coordinator.root(),
            "Router started"
        );

        Ok(routed)
    }

    pub fn stop(&self) {
        self.coordinator.deactivate();
    }

    pub fn navigate(&self, fragment: &str, options: NavigateOptions) -> Result<Option<bool>> {
        Ok(self.coordinator.navigate(fragment, options)?)
    }

    pub fn back(&self) -> Result<()> {
        Ok(self.coordinator.navigate_back()?)
    }

    pub fn forward(&self) -> Result<()> {
        Ok(self.host.navigate_forward()?)
    }

    /// Simulate the user typing a new hash into the address bar
    pub fn edit_hash(&self, fragment: &str) -> Result<()> {
        Ok(self.host.set_hash(fragment)?)
    }

    pub fn set_title(&self, title: &str) {
        self.coordinator.set_title(title);
    }

    pub fn state(&self) -> Option<CanonicalState> {
        self.coordinator.current_state()
    }

    pub fn get_state(&self, key: &str) -> Option<serde_json::Value> {
        self.coordinator.get_state(key)
    }

    pub fn absolute_root(&self) -> String {
        self.coordinator.get_absolute_root()
    }

    pub fn visits(&self) -> Vec<Visit> {
        self.visits.read().clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn coordinator(&self) -> &HistoryCoordinator<MemoryHost> {
        &self.coordinator
    }
}
