//! Coordinator options
//!
//! Options are layered: built-in defaults, then whatever a previous
//! activation stored, then the options supplied now.

use std::sync::Arc;

use crate::fragment::normalize_root;

/// Sink invoked with the state string once per distinct transition
pub type RouteHandler = Arc<dyn Fn(&str) -> anyhow::Result<bool> + Send + Sync>;

/// One layer of coordinator options. Unset fields fall through to the layer
/// below.
#[derive(Clone, Default)]
pub struct CoordinatorOptions {
    pub root: Option<String>,
    pub silent: Option<bool>,
    pub route_handler: Option<RouteHandler>,
}

impl CoordinatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bottom layer: `/` root, notify on activation, handler that matches
    /// nothing.
    pub fn defaults() -> Self {
        Self {
            root: Some("/".to_string()),
            silent: Some(false),
            route_handler: Some(unmatched_handler()),
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    pub fn with_route_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.route_handler = Some(Arc::new(handler));
        self
    }

    /// Lay `upper` over `self`; fields set in `upper` win.
    pub fn merge(self, upper: CoordinatorOptions) -> Self {
        Self {
            root: upper.root.or(self.root),
            silent: upper.silent.or(self.silent),
            route_handler: upper.route_handler.or(self.route_handler),
        }
    }

    /// Resolve into a concrete config. Fields still unset take the defaults.
    pub fn resolve(&self) -> CoordinatorConfig {
        let Self {
            root,
            silent,
            route_handler,
        } = Self::defaults().merge(self.clone());

        CoordinatorConfig {
            root: normalize_root(root.as_deref().unwrap_or("/")),
            silent: silent.unwrap_or_default(),
            route_handler: route_handler.unwrap_or_else(unmatched_handler),
        }
    }
}

fn unmatched_handler() -> RouteHandler {
    Arc::new(|_: &str| -> anyhow::Result<bool> { Ok(false) })
}

impl std::fmt::Debug for CoordinatorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorOptions")
            .field("root", &self.root)
            .field("silent", &self.silent)
            .field("route_handler", &self.route_handler.is_some())
            .finish()
    }
}

/// Resolved options, fixed for the lifetime of one activation
#[derive(Clone)]
pub struct CoordinatorConfig {
    /// Normalized, with exactly one leading and one trailing slash
    pub root: String,
    pub silent: bool,
    pub route_handler: RouteHandler,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorOptions::defaults().resolve()
    }
}

impl std::fmt::Debug for CoordinatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorConfig")
            .field("root", &self.root)
            .field("silent", &self.silent)
            .finish_non_exhaustive()
    }
}

/// Per-call options for `navigate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Invoke the route handler after writing history
    pub trigger: bool,
    /// Replace the current entry instead of pushing a new one
    pub replace: bool,
}

impl NavigateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn without_trigger(mut self) -> Self {
        self.trigger = false;
        self
    }
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            trigger: true,
            replace: false,
        }
    }
}
