//! hashroute Core
//!
//! Coordination layer: loads settings, opens a host environment and drives a
//! history coordinator over it. Every route-handler invocation is recorded as
//! a visit.

mod error;
mod router;
mod settings;

pub use error::CoreError;
pub use router::{Router, Visit};
pub use settings::Settings;

// Re-export the history and host building blocks
pub use hashroute_history::{
    is_absolute_url, normalize_root, parse_fragment, CanonicalState, CoordinatorOptions,
    History, HistoryCoordinator, HistoryError, HostEnvironment, HostError, HostEvent,
    LocationParts, NavigateOptions,
};
pub use hashroute_host::{HistoryEntry, HistoryWrite, MemoryHost, WriteKind};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
