//! Link interception seam
//!
//! Turning anchor clicks into `navigate` calls lives outside this crate. The
//! coordinator attaches an interceptor on activation and detaches it on
//! deactivation.

use std::sync::Arc;

use crate::options::NavigateOptions;
use crate::Result;

/// Where intercepted links are sent
pub trait NavigationSink: Send + Sync {
    fn navigate(&self, fragment: &str, options: NavigateOptions) -> Result<Option<bool>>;
}

pub trait LinkInterceptor: Send + Sync {
    fn attach(&self, sink: Arc<dyn NavigationSink>);
    fn detach(&self);
}

/// Interceptor for hosts without clickable links
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLinkInterception;

impl LinkInterceptor for NoLinkInterception {
    fn attach(&self, _sink: Arc<dyn NavigationSink>) {}

    fn detach(&self) {}
}
