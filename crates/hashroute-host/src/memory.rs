//! In-memory host environment

use parking_lot::Mutex;
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use url::Url;

use hashroute_history::{
    EventCallback, HostEnvironment, HostError, HostEvent, LocationParts, SubscriptionHandle,
};

use crate::entry::{HistoryEntry, HistoryWrite, WriteKind};
use crate::Result;

struct Listener {
    handle: SubscriptionHandle,
    event: HostEvent,
    callback: EventCallback,
}

struct HostInner {
    entries: Vec<HistoryEntry>,
    index: usize,
    title: String,
    listeners: Vec<Listener>,
    writes: Vec<HistoryWrite>,
    full_navigations: Vec<Url>,
    /// Whether hash edits raise `HistoryChanged` in addition to `HashChanged`
    history_events_on_hash: bool,
}

impl HostInner {
    fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    fn current_mut(&mut self) -> &mut HistoryEntry {
        let index = self.index;
        &mut self.entries[index]
    }

    /// Drop forward entries and append `entry` as the new current one
    fn push_entry(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        self.current()
            .url
            .join(url)
            .map_err(|e| HostError::InvalidUrl(format!("{}: {}", url, e)))
    }

    fn resolve_same_origin(&self, url: &str) -> Result<Url> {
        let resolved = self.resolve(url)?;
        if resolved.origin() != self.current().url.origin() {
            return Err(HostError::Rejected(format!(
                "{} is not same-origin with {}",
                resolved,
                self.current().url
            )));
        }
        Ok(resolved)
    }
}

/// Single browser tab held in memory
pub struct MemoryHost {
    inner: Arc<Mutex<HostInner>>,
}

impl MemoryHost {
    /// Open a tab at `start_url`
    pub fn new(start_url: &str) -> Result<Self> {
        let url = Url::parse(start_url)
            .map_err(|e| HostError::InvalidUrl(format!("{}: {}", start_url, e)))?;

        Ok(Self {
            inner: Arc::new(Mutex::new(HostInner {
                entries: vec![HistoryEntry::new(url, None, String::new())],
                index: 0,
                title: String::new(),
                listeners: Vec::new(),
                writes: Vec::new(),
                full_navigations: Vec::new(),
                history_events_on_hash: true,
            })),
        })
    }

    /// Hosts that only raise `HashChanged` for hash edits
    pub fn without_history_events_on_hash(self) -> Self {
        self.inner.lock().history_events_on_hash = false;
        self
    }

    pub fn current_url(&self) -> Url {
        self.inner.lock().current().url.clone()
    }

    pub fn current_index(&self) -> usize {
        self.inner.lock().index
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.inner.lock().entries.clone()
    }

    /// Every push/replace, oldest first
    pub fn writes(&self) -> Vec<HistoryWrite> {
        self.inner.lock().writes.clone()
    }

    pub fn full_navigations(&self) -> Vec<Url> {
        self.inner.lock().full_navigations.clone()
    }

    pub fn title(&self) -> String {
        self.inner.lock().title.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Simulate the user editing the hash in the address bar.
    ///
    /// Creates a new entry without a record. Editing to the current fragment
    /// does nothing.
    pub fn set_hash(&self, fragment: &str) -> Result<()> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

        let raise_history = {
            let mut inner = self.inner.lock();
            let mut url = inner.current().url.clone();
            url.set_fragment(Some(fragment));
            if url == inner.current().url {
                return Ok(());
            }

            tracing::debug!(url = %url, "Hash edited");
            let title = inner.title.clone();
            inner.push_entry(HistoryEntry::new(url, None, title));
            inner.history_events_on_hash
        };

        if raise_history {
            self.dispatch_all(&[HostEvent::HistoryChanged, HostEvent::HashChanged])
        } else {
            self.dispatch_all(&[HostEvent::HashChanged])
        }
    }

    pub fn navigate_forward(&self) -> Result<()> {
        self.traverse(true)
    }

    /// Move the cursor one entry and raise the notifications a browser would
    fn traverse(&self, forward: bool) -> Result<()> {
        let hash_changed = {
            let mut inner = self.inner.lock();
            let target = if forward {
                inner.index + 1
            } else {
                inner.index.checked_sub(1).ok_or(HostError::NoPreviousEntry)?
            };
            if target >= inner.entries.len() {
                return Err(HostError::NoNextEntry);
            }

            let before = inner.current().fragment().to_string();
            inner.index = target;
            tracing::debug!(url = %inner.current().url, index = target, "History traversed");
            inner.current().fragment() != before
        };

        if hash_changed {
            self.dispatch_all(&[HostEvent::HistoryChanged, HostEvent::HashChanged])
        } else {
            self.dispatch_all(&[HostEvent::HistoryChanged])
        }
    }

    /// Invoke listeners for each event in order. Every listener runs; the
    /// first failure is reported.
    fn dispatch_all(&self, events: &[HostEvent]) -> Result<()> {
        let mut first_error = None;

        for &event in events {
            let callbacks: Vec<EventCallback> = self
                .inner
                .lock()
                .listeners
                .iter()
                .filter(|listener| listener.event == event)
                .map(|listener| Arc::clone(&listener.callback))
                .collect();

            for callback in callbacks {
                if let Err(e) = callback(event) {
                    tracing::error!(%event, error = %e, "Event listener failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(HostError::Listener(Box::new(e))),
            None => Ok(()),
        }
    }

    fn record_write(
        &self,
        kind: WriteKind,
        record: serde_json::Value,
        url: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        let url = match url {
            Some(url) => inner.resolve_same_origin(url)?,
            None => inner.current().url.clone(),
        };

        match kind {
            WriteKind::Push => {
                let title = inner.title.clone();
                inner.push_entry(HistoryEntry::new(url.clone(), Some(record.clone()), title));
            }
            WriteKind::Replace => {
                let entry = inner.current_mut();
                entry.url = url.clone();
                entry.record = Some(record.clone());
            }
        }

        tracing::debug!(kind = %kind, url = %url, "History written");
        inner.writes.push(HistoryWrite::new(kind, url, record));
        Ok(())
    }
}

impl HostEnvironment for MemoryHost {
    /// Decoded like a browser's `location.hash`, so it compares equal to
    /// the fragment a record was written with
    fn current_fragment(&self) -> String {
        let inner = self.inner.lock();
        percent_decode_str(inner.current().fragment())
            .decode_utf8_lossy()
            .into_owned()
    }

    fn current_persisted_state(&self) -> Option<serde_json::Value> {
        self.inner.lock().current().record.clone()
    }

    fn push_state(&self, record: serde_json::Value, url: &str) -> Result<()> {
        self.record_write(WriteKind::Push, record, Some(url))
    }

    fn replace_state(&self, record: serde_json::Value, url: Option<&str>) -> Result<()> {
        self.record_write(WriteKind::Replace, record, url)
    }

    fn navigate_back(&self) -> Result<()> {
        self.traverse(false)
    }

    fn perform_full_navigation(&self, url: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let url = inner.resolve(url)?;
        let title = inner.title.clone();

        tracing::info!(url = %url, "Full navigation");
        inner.push_entry(HistoryEntry::new(url.clone(), None, title));
        inner.full_navigations.push(url);
        Ok(())
    }

    fn set_title(&self, title: &str) {
        self.inner.lock().title = title.to_string();
    }

    fn subscribe(&self, event: HostEvent, callback: EventCallback) -> SubscriptionHandle {
        let handle = SubscriptionHandle::new();
        self.inner.lock().listeners.push(Listener {
            handle,
            event,
            callback,
        });
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.inner
            .lock()
            .listeners
            .retain(|listener| listener.handle != handle);
    }

    fn location(&self) -> LocationParts {
        let url = self.current_url();

        LocationParts {
            protocol: format!("{}:", url.scheme()),
            hostname: url.host_str().unwrap_or_default().to_string(),
            port: url.port().map(|p| p.to_string()).unwrap_or_default(),
            pathname: url.path().to_string(),
            search: url.query().map(|q| format!("?{}", q)).unwrap_or_default(),
            hash: url.fragment().map(|f| format!("#{}", f)).unwrap_or_default(),
        }
    }
}

impl Clone for MemoryHost {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
