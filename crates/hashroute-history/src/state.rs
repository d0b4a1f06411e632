//! Canonical navigation state

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// The `{fragment, query}` pair the coordinator treats as ground truth.
///
/// The state string (`fragment?query`) is always derived from the two fields
/// and never stored, so equality only looks at `fragment` and `query`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct CanonicalState {
    fragment: String,
    #[serde(default)]
    query: String,
}

impl CanonicalState {
    pub(crate) fn new(fragment: String, query: String) -> Self {
        Self { fragment, query }
    }

    /// Normalized path, always starting with `/`
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Query without the leading `?`, possibly empty
    pub fn query(&self) -> &str {
        &self.query
    }

    /// `fragment`, followed by `?query` when the query is non-empty
    pub fn state_string(&self) -> String {
        if self.query.is_empty() {
            self.fragment.clone()
        } else {
            format!("{}?{}", self.fragment, self.query)
        }
    }

    /// Record persisted alongside a history entry.
    pub fn to_record(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Read a persisted record back. Records written by anything other than
    /// [`CanonicalState::to_record`] are treated as absent.
    pub fn from_record(record: &serde_json::Value) -> Option<Self> {
        match Self::deserialize(record) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable history record");
                None
            }
        }
    }
}

impl Serialize for CanonicalState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("CanonicalState", 3)?;
        record.serialize_field("fragment", &self.fragment)?;
        record.serialize_field("query", &self.query)?;
        record.serialize_field("stateString", &self.state_string())?;
        record.end()
    }
}

impl std::fmt::Display for CanonicalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.state_string())
    }
}
