//! hashroute History
//!
//! Keeps an application's navigation state in step with a browser-like
//! address bar. Three channels can change the visible location:
//! 1. Programmatic `navigate` calls
//! 2. Back/forward history moves
//! 3. Hash edits in the address bar
//!
//! Every channel funnels into one canonical `{fragment, query}` state, and the
//! route handler is invoked once per distinct transition.

mod coordinator;
mod error;
mod fragment;
mod host;
mod link;
mod options;
mod state;

pub use coordinator::{History, HistoryCoordinator};
pub use error::{HistoryError, HostError};
pub use fragment::{is_absolute_url, normalize_root, parse_fragment};
pub use host::{EventCallback, HostEnvironment, HostEvent, LocationParts, SubscriptionHandle};
pub use link::{LinkInterceptor, NavigationSink, NoLinkInterception};
pub use options::{CoordinatorConfig, CoordinatorOptions, NavigateOptions, RouteHandler};
pub use state::CanonicalState;

pub type Result<T> = std::result::Result<T, HistoryError>;
