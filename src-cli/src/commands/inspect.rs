//! Inspection commands

use serde::{Deserialize, Serialize};

use hashroute_core::{HistoryEntry, Visit};

use super::CommandResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct StateInfo {
    pub fragment: String,
    pub query: String,
    pub state_string: String,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryInfo {
    pub index: usize,
    pub current: bool,
    pub url: String,
    pub record: Option<serde_json::Value>,
    pub title: String,
    pub created_at: String,
}

impl EntryInfo {
    fn new(index: usize, current: bool, entry: HistoryEntry) -> Self {
        Self {
            index,
            current,
            url: entry.url.to_string(),
            record: entry.record,
            title: entry.title,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

pub fn current_state(state: &AppState) -> CommandResult<StateInfo> {
    let router = state.router();
    match router.state() {
        Some(current) => CommandResult::ok(StateInfo {
            fragment: current.fragment().to_string(),
            query: current.query().to_string(),
            state_string: current.state_string(),
            url: router.host().current_url().to_string(),
            title: router.host().title(),
        }),
        None => CommandResult::err("Router has not adopted a state yet".to_string()),
    }
}

pub fn entries(state: &AppState) -> CommandResult<Vec<EntryInfo>> {
    let host = state.router().host();
    let current = host.current_index();

    let entries = host
        .entries()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| EntryInfo::new(index, index == current, entry))
        .collect();

    CommandResult::ok(entries)
}

pub fn visits(state: &AppState) -> CommandResult<Vec<Visit>> {
    CommandResult::ok(state.router().visits())
}

pub fn absolute_root(state: &AppState) -> CommandResult<String> {
    CommandResult::ok(state.router().absolute_root())
}

pub fn get_state(state: &AppState, key: &str) -> CommandResult<Option<serde_json::Value>> {
    CommandResult::ok(state.router().get_state(key))
}

pub fn set_title(state: &AppState, title: &str) -> CommandResult<String> {
    state.router().set_title(title);
    CommandResult::ok(title.to_string())
}
