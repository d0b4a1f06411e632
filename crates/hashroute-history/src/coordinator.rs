//! History coordinator
//!
//! Owns the canonical state and reconciles it with the host:
//! ```text
//! Inactive
//!   ↓ activate
//! Active
//!   ↓ deactivate
//! Inactive
//! ```
//!
//! The coordinator lock is only held while state is compared and adopted.
//! Route handlers and the link interceptor always run unlocked, so a handler
//! may call back into `navigate`.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::HistoryError;
use crate::fragment::{collapse_slashes, is_absolute_url, parse_fragment};
use crate::host::{HostEnvironment, HostEvent, SubscriptionHandle};
use crate::link::{LinkInterceptor, NavigationSink, NoLinkInterception};
use crate::options::{CoordinatorConfig, CoordinatorOptions, NavigateOptions, RouteHandler};
use crate::state::CanonicalState;
use crate::Result;

/// Navigation capability exposed to applications
pub trait History {
    fn activate(&self, options: CoordinatorOptions) -> Result<bool>;
    fn deactivate(&self);
    fn navigate(&self, fragment: &str, options: NavigateOptions) -> Result<Option<bool>>;
    fn navigate_back(&self) -> Result<()>;
    fn get_state(&self, key: &str) -> Option<serde_json::Value>;
    fn set_title(&self, title: &str);
}

#[derive(Default)]
struct CoordinatorInner {
    active: bool,
    /// Options stored by the last activation
    options: CoordinatorOptions,
    config: CoordinatorConfig,
    history_state: Option<CanonicalState>,
    subscriptions: Vec<SubscriptionHandle>,
}

pub struct HistoryCoordinator<H: HostEnvironment> {
    host: Arc<H>,
    inner: Arc<Mutex<CoordinatorInner>>,
    interceptor: Arc<dyn LinkInterceptor>,
}

impl<H: HostEnvironment + 'static> HistoryCoordinator<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self::with_interceptor(host, Arc::new(NoLinkInterception))
    }

    pub fn with_interceptor(host: Arc<H>, interceptor: Arc<dyn LinkInterceptor>) -> Self {
        Self {
            host,
            inner: Arc::new(Mutex::new(CoordinatorInner::default())),
            interceptor,
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    /// Normalized root of the current (or last) activation
    pub fn root(&self) -> String {
        self.inner.lock().config.root.clone()
    }

    /// Canonical state currently held, if any has been adopted
    pub fn current_state(&self) -> Option<CanonicalState> {
        self.inner.lock().history_state.clone()
    }

    /// Start listening to the host.
    ///
    /// Returns the route handler's result for the current location, or
    /// `false` when activated silently. Fails with
    /// [`HistoryError::AlreadyActivated`] without side effects when already
    /// active.
    ///
    /// The current state is always re-derived from the host, so a
    /// reactivation never routes a state held from before the host moved.
    /// Nothing is committed until that derivation succeeds.
    pub fn activate(&self, options: CoordinatorOptions) -> Result<bool> {
        let resolved = {
            let inner = self.inner.lock();
            if inner.active {
                return Err(HistoryError::AlreadyActivated);
            }
            CoordinatorOptions::defaults()
                .merge(inner.options.clone())
                .merge(options)
        };

        let state = self.load_history_state()?;

        let (handler, silent) = {
            let mut inner = self.inner.lock();
            if inner.active {
                return Err(HistoryError::AlreadyActivated);
            }

            inner.config = resolved.resolve();
            inner.options = resolved;
            inner.active = true;
            inner.history_state = Some(state.clone());

            (inner.config.route_handler.clone(), inner.config.silent)
        };
        tracing::debug!(state = %state, "Adopted initial state");

        let subscriptions = [HostEvent::HistoryChanged, HostEvent::HashChanged]
            .into_iter()
            .map(|event| self.subscribe(event))
            .collect();
        self.inner.lock().subscriptions = subscriptions;

        self.interceptor.attach(Arc::new(self.downgrade()));

        tracing::info!(root = %self.root(), silent, "History activated");

        if silent {
            return Ok(false);
        }
        notify(&handler, &state)
    }

    /// Stop listening to the host. Idempotent.
    pub fn deactivate(&self) {
        let subscriptions = {
            let mut inner = self.inner.lock();
            if !inner.active {
                return;
            }
            inner.active = false;
            std::mem::take(&mut inner.subscriptions)
        };

        for handle in subscriptions {
            self.host.unsubscribe(handle);
        }
        self.interceptor.detach();

        tracing::info!("History deactivated");
    }

    /// Navigate to `fragment`.
    ///
    /// Returns `Some(true)` for absolute URLs (handed to the host as a full
    /// navigation), `Some(false)` when inactive or when the target equals the
    /// current state, `None` when `trigger` is off, and otherwise the route
    /// handler's result.
    pub fn navigate(&self, fragment: &str, options: NavigateOptions) -> Result<Option<bool>> {
        if is_absolute_url(fragment) {
            tracing::info!(url = %fragment, "Leaving application");
            self.host.perform_full_navigation(fragment)?;
            return Ok(Some(true));
        }

        let candidate = parse_fragment(fragment, None);

        let (url, handler) = {
            let mut inner = self.inner.lock();
            if !inner.active {
                tracing::debug!(fragment = %fragment, "Navigation before activation ignored");
                return Ok(Some(false));
            }

            if !options.replace && inner.history_state.as_ref() == Some(&candidate) {
                tracing::debug!(state = %candidate, "Already at navigation target");
                return Ok(Some(false));
            }

            inner.history_state = Some(candidate.clone());
            let url = build_url(&inner.config.root, fragment, candidate.fragment());
            (url, inner.config.route_handler.clone())
        };

        let record = candidate.to_record()?;
        if options.replace {
            self.host.replace_state(record, Some(&url))?;
        } else {
            self.host.push_state(record, &url)?;
        }

        tracing::info!(
            url = %url,
            state = %candidate,
            replace = options.replace,
            "History entry written"
        );

        if !options.trigger {
            return Ok(None);
        }
        notify(&handler, &candidate).map(Some)
    }

    pub fn navigate_back(&self) -> Result<()> {
        Ok(self.host.navigate_back()?)
    }

    /// Scheme, host, optional port and root, e.g. `https://example.io:8080/app/`
    pub fn get_absolute_root(&self) -> String {
        let location = self.host.location();
        let port = if location.port.is_empty() {
            String::new()
        } else {
            format!(":{}", location.port)
        };

        format!(
            "{}//{}{}{}",
            location.protocol,
            location.hostname,
            port,
            self.root()
        )
    }

    /// Field `key` of the current entry's persisted record
    pub fn get_state(&self, key: &str) -> Option<serde_json::Value> {
        self.host
            .current_persisted_state()
            .and_then(|record| record.get(key).cloned())
    }

    pub fn set_title(&self, title: &str) {
        self.host.set_title(title);
    }

    /// Visible state parsed from the hash alone, ignoring persisted records
    pub fn get_fragment(&self) -> CanonicalState {
        parse_fragment(&self.host.current_fragment(), None)
    }

    /// Reconcile with the host and notify on a genuine transition.
    ///
    /// Returns `false` when the host's state equals the state already held,
    /// which is what suppresses the second of two notifications raised for
    /// one user gesture. Does nothing while inactive.
    pub fn check_url(&self) -> Result<bool> {
        if !self.is_active() {
            return Ok(false);
        }

        let state = self.load_history_state()?;

        let handler = {
            let mut inner = self.inner.lock();
            if !inner.active {
                return Ok(false);
            }
            if inner.history_state.as_ref() == Some(&state) {
                tracing::debug!(state = %state, "State unchanged, notification suppressed");
                return Ok(false);
            }
            inner.history_state = Some(state.clone());
            inner.config.route_handler.clone()
        };

        tracing::debug!(state = %state, "State changed");
        notify(&handler, &state)
    }

    /// Derive the current state from the visible hash and the persisted
    /// record, rewriting the record when it no longer matches the hash.
    fn load_history_state(&self) -> Result<CanonicalState> {
        let current = self.host.current_fragment();
        let hash_only = parse_fragment(&current, None);

        if !hash_only.query().is_empty() {
            return Ok(hash_only);
        }

        let persisted = self
            .host
            .current_persisted_state()
            .and_then(|record| CanonicalState::from_record(&record));

        match persisted {
            Some(persisted) if persisted.fragment() == hash_only.fragment() => {
                Ok(parse_fragment(&current, Some(persisted.query())))
            }
            persisted => {
                tracing::warn!(
                    fragment = %hash_only.fragment(),
                    recorded = ?persisted.as_ref().map(CanonicalState::fragment),
                    "History record out of date, rewriting"
                );
                self.host.replace_state(hash_only.to_record()?, None)?;
                Ok(hash_only)
            }
        }
    }

    fn subscribe(&self, event: HostEvent) -> SubscriptionHandle {
        let weak = self.downgrade();
        self.host.subscribe(
            event,
            Arc::new(move |event: HostEvent| {
                let Some(coordinator) = weak.upgrade() else {
                    return Ok(());
                };
                tracing::debug!(%event, "Host notification");
                coordinator.check_url().map(|_| ())
            }),
        )
    }

    fn downgrade(&self) -> WeakCoordinator<H> {
        WeakCoordinator {
            host: Arc::downgrade(&self.host),
            inner: Arc::downgrade(&self.inner),
            interceptor: Arc::clone(&self.interceptor),
        }
    }
}

impl<H: HostEnvironment + 'static> History for HistoryCoordinator<H> {
    fn activate(&self, options: CoordinatorOptions) -> Result<bool> {
        HistoryCoordinator::activate(self, options)
    }

    fn deactivate(&self) {
        HistoryCoordinator::deactivate(self)
    }

    fn navigate(&self, fragment: &str, options: NavigateOptions) -> Result<Option<bool>> {
        HistoryCoordinator::navigate(self, fragment, options)
    }

    fn navigate_back(&self) -> Result<()> {
        HistoryCoordinator::navigate_back(self)
    }

    fn get_state(&self, key: &str) -> Option<serde_json::Value> {
        HistoryCoordinator::get_state(self, key)
    }

    fn set_title(&self, title: &str) {
        HistoryCoordinator::set_title(self, title)
    }
}

impl<H: HostEnvironment> Clone for HistoryCoordinator<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            inner: Arc::clone(&self.inner),
            interceptor: Arc::clone(&self.interceptor),
        }
    }
}

/// Handle held by host listeners and link interceptors. Does not keep the
/// coordinator alive.
struct WeakCoordinator<H: HostEnvironment> {
    host: Weak<H>,
    inner: Weak<Mutex<CoordinatorInner>>,
    interceptor: Arc<dyn LinkInterceptor>,
}

impl<H: HostEnvironment> WeakCoordinator<H> {
    fn upgrade(&self) -> Option<HistoryCoordinator<H>> {
        Some(HistoryCoordinator {
            host: self.host.upgrade()?,
            inner: self.inner.upgrade()?,
            interceptor: Arc::clone(&self.interceptor),
        })
    }
}

impl<H: HostEnvironment + 'static> NavigationSink for WeakCoordinator<H> {
    fn navigate(&self, fragment: &str, options: NavigateOptions) -> Result<Option<bool>> {
        match self.upgrade() {
            Some(coordinator) => coordinator.navigate(fragment, options),
            None => Ok(Some(false)),
        }
    }
}

fn notify(handler: &RouteHandler, state: &CanonicalState) -> Result<bool> {
    handler(&state.state_string()).map_err(HistoryError::Handler)
}

/// `root#fragment`, dropping the root's trailing slash when navigating to an
/// empty fragment under a non-`/` root.
fn build_url(root: &str, input: &str, fragment: &str) -> String {
    let base = if input.is_empty() && root != "/" {
        root.strip_suffix('/').unwrap_or(root)
    } else {
        root
    };

    collapse_slashes(&format!("{}#{}", base, fragment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::{EventCallback, LocationParts};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    enum Write {
        Push { url: String, record: serde_json::Value },
        Replace { url: Option<String>, record: serde_json::Value },
    }

    #[derive(Default)]
    struct FakeState {
        fragment: String,
        record: Option<serde_json::Value>,
        writes: Vec<Write>,
        full_navigations: Vec<String>,
        listeners: Vec<(SubscriptionHandle, HostEvent, EventCallback)>,
        title: String,
        back_calls: usize,
        /// Fail every push/replace, like a host out of storage quota
        reject_writes: bool,
    }

    /// Minimal host: one visible fragment, one record, a write log.
    #[derive(Default)]
    struct FakeHost {
        state: Mutex<FakeState>,
    }

    impl FakeHost {
        fn at(fragment: &str) -> Arc<Self> {
            let host = Self::default();
            host.state.lock().fragment = fragment.to_string();
            Arc::new(host)
        }

        fn set_record(&self, record: serde_json::Value) {
            self.state.lock().record = Some(record);
        }

        fn reject_writes(&self, reject: bool) {
            self.state.lock().reject_writes = reject;
        }

        /// Simulate the user editing the hash: new fragment, no record.
        fn edit_hash(&self, fragment: &str, events: &[HostEvent]) -> Result<()> {
            {
                let mut state = self.state.lock();
                state.fragment = fragment.to_string();
                state.record = None;
            }
            for event in events {
                self.fire(*event)?;
            }
            Ok(())
        }

        fn fire(&self, event: HostEvent) -> Result<()> {
            let callbacks: Vec<EventCallback> = self
                .state
                .lock()
                .listeners
                .iter()
                .filter(|(_, e, _)| *e == event)
                .map(|(_, _, callback)| Arc::clone(callback))
                .collect();
            for callback in callbacks {
                callback(event)?;
            }
            Ok(())
        }

        fn writes(&self) -> Vec<Write> {
            self.state.lock().writes.clone()
        }

        fn listener_count(&self) -> usize {
            self.state.lock().listeners.len()
        }
    }

    impl HostEnvironment for FakeHost {
        fn current_fragment(&self) -> String {
            self.state.lock().fragment.clone()
        }

        fn current_persisted_state(&self) -> Option<serde_json::Value> {
            self.state.lock().record.clone()
        }

        fn push_state(
            &self,
            record: serde_json::Value,
            url: &str,
        ) -> std::result::Result<(), HostError> {
            let mut state = self.state.lock();
            if state.reject_writes {
                return Err(HostError::Rejected("quota".to_string()));
            }
            state.fragment = url.split_once('#').map(|(_, f)| f).unwrap_or("").to_string();
            state.record = Some(record.clone());
            state.writes.push(Write::Push {
                url: url.to_string(),
                record,
            });
            Ok(())
        }

        fn replace_state(
            &self,
            record: serde_json::Value,
            url: Option<&str>,
        ) -> std::result::Result<(), HostError> {
            let mut state = self.state.lock();
            if state.reject_writes {
                return Err(HostError::Rejected("quota".to_string()));
            }
            if let Some(url) = url {
                state.fragment = url.split_once('#').map(|(_, f)| f).unwrap_or("").to_string();
            }
            state.record = Some(record.clone());
            state.writes.push(Write::Replace {
                url: url.map(str::to_string),
                record,
            });
            Ok(())
        }

        fn navigate_back(&self) -> std::result::Result<(), HostError> {
            self.state.lock().back_calls += 1;
            Ok(())
        }

        fn perform_full_navigation(&self, url: &str) -> std::result::Result<(), HostError> {
            self.state.lock().full_navigations.push(url.to_string());
            Ok(())
        }

        fn set_title(&self, title: &str) {
            self.state.lock().title = title.to_string();
        }

        fn subscribe(&self, event: HostEvent, callback: EventCallback) -> SubscriptionHandle {
            let handle = SubscriptionHandle::new();
            self.state.lock().listeners.push((handle, event, callback));
            handle
        }

        fn unsubscribe(&self, handle: SubscriptionHandle) {
            self.state.lock().listeners.retain(|(h, _, _)| *h != handle);
        }

        fn location(&self) -> LocationParts {
            LocationParts {
                protocol: "https:".to_string(),
                hostname: "www.example.io".to_string(),
                port: "8080".to_string(),
                pathname: "/app/".to_string(),
                search: String::new(),
                hash: format!("#{}", self.state.lock().fragment),
            }
        }
    }

    /// Options whose handler records every state string it receives.
    fn recording(calls: &Arc<Mutex<Vec<String>>>) -> CoordinatorOptions {
        let calls = Arc::clone(calls);
        CoordinatorOptions::new().with_route_handler(move |state| {
            calls.lock().push(state.to_string());
            Ok(true)
        })
    }

    fn pushes(host: &FakeHost) -> Vec<(String, serde_json::Value)> {
        host.writes()
            .into_iter()
            .filter_map(|write| match write {
                Write::Push { url, record } => Some((url, record["query"].clone())),
                Write::Replace { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_activate_notifies_current_state() {
        let host = FakeHost::at("/a/b?x=1");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));

        assert!(coordinator.activate(recording(&calls)).unwrap());
        assert!(coordinator.is_active());
        assert_eq!(*calls.lock(), vec!["/a/b?x=1".to_string()]);
        assert_eq!(host.listener_count(), 2);
    }

    #[test]
    fn test_silent_activation() {
        let host = FakeHost::at("/a");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));

        let result = coordinator
            .activate(recording(&calls).with_silent(true))
            .unwrap();
        assert!(!result);
        assert!(calls.lock().is_empty());
        assert_eq!(coordinator.current_state().unwrap().fragment(), "/a");
    }

    #[test]
    fn test_double_activate_fails() {
        let host = FakeHost::at("/a");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        coordinator.activate(CoordinatorOptions::new()).unwrap();
        let before = coordinator.current_state();

        let err = coordinator
            .activate(CoordinatorOptions::new().with_root("/other"))
            .unwrap_err();
        assert!(matches!(err, HistoryError::AlreadyActivated));
        assert_eq!(coordinator.current_state(), before);
        assert_eq!(coordinator.root(), "/");
        assert_eq!(host.listener_count(), 2);
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let host = FakeHost::at("/a");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));

        coordinator.deactivate();
        coordinator.activate(CoordinatorOptions::new()).unwrap();
        coordinator.deactivate();
        coordinator.deactivate();

        assert!(!coordinator.is_active());
        assert_eq!(host.listener_count(), 0);

        // Reactivation keeps the stored options
        coordinator
            .activate(CoordinatorOptions::new().with_silent(true))
            .unwrap();
        assert!(coordinator.is_active());
        assert_eq!(host.listener_count(), 2);
    }

    #[test]
    fn test_stored_options_layer_under_new_ones() {
        let host = FakeHost::at("");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));

        coordinator
            .activate(recording(&calls).with_root("app").with_silent(true))
            .unwrap();
        coordinator.deactivate();

        let result = coordinator
            .activate(CoordinatorOptions::new().with_root("/shop/"))
            .unwrap();

        // silent and the handler survive from the first activation
        assert!(!result);
        assert!(calls.lock().is_empty());
        assert_eq!(coordinator.root(), "/shop/");
    }

    #[test]
    fn test_navigate_push_sequence() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        coordinator
            .activate(CoordinatorOptions::new().with_silent(true))
            .unwrap();

        coordinator.navigate("#/a/b", NavigateOptions::new()).unwrap();
        coordinator.navigate("#/?a=1", NavigateOptions::new()).unwrap();
        coordinator.navigate("#/a/c?a=1", NavigateOptions::new()).unwrap();

        assert_eq!(
            pushes(&host),
            vec![
                ("/#/a/b".to_string(), json!("")),
                ("/#/".to_string(), json!("a=1")),
                ("/#/a/c".to_string(), json!("a=1")),
            ]
        );
    }

    #[test]
    fn test_navigate_deduplicates() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));
        coordinator
            .activate(recording(&calls).with_silent(true))
            .unwrap();

        assert_eq!(
            coordinator.navigate("#/a?x=1", NavigateOptions::new()).unwrap(),
            Some(true)
        );
        assert_eq!(
            coordinator.navigate("/a?x=1  ", NavigateOptions::new()).unwrap(),
            Some(false)
        );
        assert_eq!(pushes(&host).len(), 1);
        assert_eq!(*calls.lock(), vec!["/a?x=1".to_string()]);

        // replace bypasses the equality check
        coordinator
            .navigate("#/a?x=1", NavigateOptions::new().replace())
            .unwrap();
        assert!(matches!(
            host.writes().last(),
            Some(Write::Replace { url: Some(url), .. }) if url == "/#/a"
        ));
    }

    #[test]
    fn test_navigate_without_trigger() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));
        coordinator
            .activate(recording(&calls).with_silent(true))
            .unwrap();

        let result = coordinator
            .navigate("next", NavigateOptions::new().without_trigger())
            .unwrap();
        assert_eq!(result, None);
        assert!(calls.lock().is_empty());
        assert_eq!(coordinator.current_state().unwrap().fragment(), "/next");
    }

    #[test]
    fn test_navigate_before_activation() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));

        assert_eq!(
            coordinator.navigate("#/a", NavigateOptions::new()).unwrap(),
            Some(false)
        );
        assert!(host.writes().is_empty());
    }

    #[test]
    fn test_absolute_url_bypass() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));

        // Inactive, yet still navigates
        assert_eq!(
            coordinator
                .navigate("https://example.com", NavigateOptions::new())
                .unwrap(),
            Some(true)
        );
        assert_eq!(
            host.state.lock().full_navigations,
            vec!["https://example.com".to_string()]
        );
        assert!(host.writes().is_empty());
        assert!(coordinator.current_state().is_none());
    }

    #[test]
    fn test_navigate_to_empty_fragment_under_root() {
        let host = FakeHost::at("/x");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        coordinator
            .activate(CoordinatorOptions::new().with_root("app").with_silent(true))
            .unwrap();

        coordinator.navigate("", NavigateOptions::new()).unwrap();
        coordinator.navigate("a", NavigateOptions::new()).unwrap();

        let urls: Vec<String> = pushes(&host).into_iter().map(|(url, _)| url).collect();
        assert_eq!(urls, vec!["/app#/".to_string(), "/app/#/a".to_string()]);
    }

    #[test]
    fn test_self_healing_rewrites_record() {
        let host = FakeHost::at("/new");
        host.set_record(json!({ "fragment": "/old", "query": "q=1" }));
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));

        coordinator.activate(recording(&calls)).unwrap();

        assert_eq!(*calls.lock(), vec!["/new".to_string()]);
        assert_eq!(
            host.writes(),
            vec![Write::Replace {
                url: None,
                record: json!({ "fragment": "/new", "query": "", "stateString": "/new" }),
            }]
        );
    }

    #[test]
    fn test_matching_record_restores_query() {
        let host = FakeHost::at("/list");
        host.set_record(json!({ "fragment": "/list", "query": "page=2" }));
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));

        coordinator.activate(recording(&calls)).unwrap();

        assert_eq!(*calls.lock(), vec!["/list?page=2".to_string()]);
        assert!(host.writes().is_empty());
    }

    #[test]
    fn test_visible_query_is_trusted() {
        let host = FakeHost::at("/list?page=3");
        host.set_record(json!({ "fragment": "/other", "query": "page=2" }));
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        coordinator
            .activate(CoordinatorOptions::new().with_silent(true))
            .unwrap();

        assert_eq!(
            coordinator.current_state().unwrap().state_string(),
            "/list?page=3"
        );
        assert!(host.writes().is_empty());
    }

    #[test]
    fn test_duplicate_notifications_notify_once() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));
        coordinator
            .activate(recording(&calls).with_silent(true))
            .unwrap();

        host.edit_hash(
            "#/inbox",
            &[HostEvent::HistoryChanged, HostEvent::HashChanged],
        )
        .unwrap();

        assert_eq!(*calls.lock(), vec!["/inbox".to_string()]);
        assert_eq!(coordinator.get_state("fragment"), Some(json!("/inbox")));
    }

    #[test]
    fn test_no_notifications_after_deactivate() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));
        coordinator
            .activate(recording(&calls).with_silent(true))
            .unwrap();
        coordinator.deactivate();

        host.edit_hash("#/inbox", &[HostEvent::HashChanged]).unwrap();
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_handler_failure_propagates() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        coordinator
            .activate(
                CoordinatorOptions::new()
                    .with_silent(true)
                    .with_route_handler(|state| anyhow::bail!("no route for {}", state)),
            )
            .unwrap();

        let err = coordinator
            .navigate("#/missing", NavigateOptions::new())
            .unwrap_err();
        assert!(matches!(err, HistoryError::Handler(_)));
        // The state was adopted before the handler ran
        assert_eq!(coordinator.current_state().unwrap().fragment(), "/missing");

        let err = host
            .edit_hash("#/elsewhere", &[HostEvent::HashChanged])
            .unwrap_err();
        assert!(matches!(err, HistoryError::Handler(_)));
    }

    #[test]
    fn test_handler_may_navigate() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let redirector = coordinator.clone();
        coordinator
            .activate(
                CoordinatorOptions::new()
                    .with_silent(true)
                    .with_route_handler(move |state| {
                        if state == "/old" {
                            redirector.navigate("/new", NavigateOptions::new().replace())?;
                        }
                        Ok(true)
                    }),
            )
            .unwrap();

        coordinator.navigate("/old", NavigateOptions::new()).unwrap();
        assert_eq!(coordinator.current_state().unwrap().fragment(), "/new");
    }

    #[test]
    fn test_reactivation_routes_visible_location() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));
        coordinator
            .activate(recording(&calls).with_silent(true))
            .unwrap();
        coordinator.deactivate();

        // Unobserved while inactive
        host.edit_hash("/elsewhere", &[]).unwrap();

        assert!(coordinator
            .activate(CoordinatorOptions::new().with_silent(false))
            .unwrap());
        assert_eq!(*calls.lock(), vec!["/elsewhere".to_string()]);
        assert_eq!(
            coordinator.current_state().unwrap().fragment(),
            "/elsewhere"
        );
        assert_eq!(coordinator.get_state("fragment"), Some(json!("/elsewhere")));
    }

    #[test]
    fn test_failed_activation_can_be_retried() {
        let host = FakeHost::at("/new");
        host.set_record(json!({ "fragment": "/old", "query": "" }));
        host.reject_writes(true);
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));

        let err = coordinator.activate(recording(&calls)).unwrap_err();
        assert!(matches!(err, HistoryError::Host(HostError::Rejected(_))));
        assert!(!coordinator.is_active());
        assert!(coordinator.current_state().is_none());
        assert_eq!(host.listener_count(), 0);
        assert!(calls.lock().is_empty());

        host.reject_writes(false);
        assert!(coordinator.activate(recording(&calls)).unwrap());
        assert_eq!(*calls.lock(), vec!["/new".to_string()]);
        assert_eq!(host.listener_count(), 2);
    }

    #[test]
    fn test_navigate_adopts_before_write() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));
        coordinator
            .activate(recording(&calls).with_silent(true))
            .unwrap();
        host.reject_writes(true);

        let err = coordinator
            .navigate("#/a?x=1", NavigateOptions::new())
            .unwrap_err();
        assert!(matches!(err, HistoryError::Host(HostError::Rejected(_))));
        assert_eq!(coordinator.current_state().unwrap().state_string(), "/a?x=1");
        assert!(calls.lock().is_empty());
        assert!(pushes(&host).is_empty());

        // The target is now held, so a retry is a no-op
        host.reject_writes(false);
        assert_eq!(
            coordinator.navigate("#/a?x=1", NavigateOptions::new()).unwrap(),
            Some(false)
        );
    }

    #[test]
    fn test_check_url_inactive() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        let calls = Arc::new(Mutex::new(Vec::new()));
        coordinator
            .activate(recording(&calls).with_silent(true))
            .unwrap();
        coordinator.deactivate();
        let writes = host.writes().len();

        host.edit_hash("/moved", &[]).unwrap();
        assert!(!coordinator.check_url().unwrap());
        assert!(calls.lock().is_empty());
        assert_eq!(host.writes().len(), writes);
        assert_eq!(coordinator.current_state().unwrap().fragment(), "/");
    }

    #[test]
    fn test_absolute_root() {
        let host = FakeHost::at("/");
        let coordinator = HistoryCoordinator::new(Arc::clone(&host));
        coordinator
            .activate(CoordinatorOptions::new().with_root("/app/").with_silent(true))
            .unwrap();
        assert_eq!(
            coordinator.get_absolute_root(),
            "https://www.example.io:8080/app/"
        );
    }

    #[test]
    fn test_capability_trait() {
        let host = FakeHost::at("/");
        let history: Box<dyn History> = Box::new(HistoryCoordinator::new(Arc::clone(&host)));

        history
            .activate(CoordinatorOptions::new().with_silent(true))
            .unwrap();
        history.navigate("/a?b=1", NavigateOptions::new()).unwrap();
        history.set_title("Inbox");
        history.navigate_back().unwrap();

        assert_eq!(history.get_state("query"), Some(json!("b=1")));
        assert_eq!(host.state.lock().title, "Inbox");
        assert_eq!(host.state.lock().back_calls, 1);
        assert_eq!(history.get_state("missing"), None);
    }

    #[test]
    fn test_build_url() {
        assert_eq!(build_url("/", "#/a/b", "/a/b"), "/#/a/b");
        assert_eq!(build_url("/", "", "/"), "/#/");
        assert_eq!(build_url("/app/", "", "/"), "/app#/");
        assert_eq!(build_url("/app/", "#/", "/"), "/app/#/");
        assert_eq!(build_url("/app/", "x", "/x"), "/app/#/x");
    }
}
