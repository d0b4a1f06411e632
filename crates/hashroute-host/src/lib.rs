//! hashroute Host
//!
//! In-memory host environment that behaves like a single browser tab:
//! a current URL, a history stack with one record per entry, and
//! synchronous change notifications.
//! `push_state` and `replace_state` never raise notifications; traversal and
//! hash edits do.

mod entry;
mod memory;

pub use entry::{HistoryEntry, HistoryWrite, WriteKind};
pub use memory::MemoryHost;

pub type Result<T> = std::result::Result<T, hashroute_history::HostError>;
