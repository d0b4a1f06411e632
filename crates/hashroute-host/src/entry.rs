//! History stack entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// One entry of the host's history stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: Url,
    /// Record attached by `push_state`/`replace_state`; `None` for entries
    /// created by hash edits or full navigations
    pub record: Option<serde_json::Value>,
    /// Document title when the entry was created
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(url: Url, record: Option<serde_json::Value>, title: String) -> Self {
        Self {
            url,
            record,
            title,
            created_at: Utc::now(),
        }
    }

    /// Fragment without the leading `#`
    pub fn fragment(&self) -> &str {
        self.url.fragment().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteKind {
    Push,
    Replace,
}

impl WriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteKind::Push => "push",
            WriteKind::Replace => "replace",
        }
    }
}

impl std::fmt::Display for WriteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `push_state`/`replace_state` call as the host saw it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryWrite {
    pub kind: WriteKind,
    /// Resolved URL of the entry after the write
    pub url: Url,
    pub record: serde_json::Value,
    pub written_at: DateTime<Utc>,
}

impl HistoryWrite {
    pub fn new(kind: WriteKind, url: Url, record: serde_json::Value) -> Self {
        Self {
            kind,
            url,
            record,
            written_at: Utc::now(),
        }
    }
}
