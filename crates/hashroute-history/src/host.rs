//! Host environment capabilities
//!
//! The coordinator never touches a location or history stack directly. A host
//! (a real browser binding, or an in-memory stand-in) exposes these primitives
//! and raises change notifications through handle-returning subscriptions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HostError;
use crate::HistoryError;

/// Change notifications a host can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Back/forward traversal, and on most platforms hash edits too
    HistoryChanged,
    /// The visible hash changed
    HashChanged,
}

impl HostEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostEvent::HistoryChanged => "historyChanged",
            HostEvent::HashChanged => "hashChanged",
        }
    }
}

impl std::fmt::Display for HostEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Listener invoked synchronously by the host's dispatch
pub type EventCallback = Arc<dyn Fn(HostEvent) -> Result<(), HistoryError> + Send + Sync>;

/// Opaque handle returned by [`HostEnvironment::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(Uuid);

impl SubscriptionHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Browser-style split of the current location.
///
/// `protocol` keeps its trailing `:` and `port` is empty for the scheme's
/// default port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationParts {
    pub protocol: String,
    pub hostname: String,
    pub port: String,
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

pub trait HostEnvironment: Send + Sync {
    /// Visible fragment, with or without its leading `#`
    fn current_fragment(&self) -> String;

    /// Record attached to the current history entry, if any
    fn current_persisted_state(&self) -> Option<serde_json::Value>;

    /// Append a history entry. Must not raise change notifications.
    fn push_state(&self, record: serde_json::Value, url: &str) -> Result<(), HostError>;

    /// Overwrite the current entry. `None` keeps the current URL.
    fn replace_state(&self, record: serde_json::Value, url: Option<&str>)
        -> Result<(), HostError>;

    fn navigate_back(&self) -> Result<(), HostError>;

    /// Leave the application entirely
    fn perform_full_navigation(&self, url: &str) -> Result<(), HostError>;

    fn set_title(&self, title: &str);

    fn subscribe(&self, event: HostEvent, callback: EventCallback) -> SubscriptionHandle;

    fn unsubscribe(&self, handle: SubscriptionHandle);

    fn location(&self) -> LocationParts;
}
