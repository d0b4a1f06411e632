//! Navigation commands

use serde::{Deserialize, Serialize};

use hashroute_core::NavigateOptions;

use super::CommandResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct NavigationInfo {
    /// Route handler result, when the command produced a notification
    pub routed: Option<bool>,
    /// Canonical state string after the command
    pub state: Option<String>,
    /// Visible URL after the command
    pub url: String,
}

impl NavigationInfo {
    fn capture(state: &AppState, routed: Option<bool>) -> Self {
        let router = state.router();
        Self {
            routed,
            state: router.state().map(|s| s.state_string()),
            url: router.host().current_url().to_string(),
        }
    }
}

pub fn navigate(
    state: &AppState,
    fragment: &str,
    options: NavigateOptions,
) -> CommandResult<NavigationInfo> {
    match state.router().navigate(fragment, options) {
        Ok(routed) => CommandResult::ok(NavigationInfo::capture(state, routed)),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

pub fn edit_hash(state: &AppState, fragment: &str) -> CommandResult<NavigationInfo> {
    match state.router().edit_hash(fragment) {
        Ok(()) => CommandResult::ok(NavigationInfo::capture(state, None)),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

pub fn back(state: &AppState) -> CommandResult<NavigationInfo> {
    match state.router().back() {
        Ok(()) => CommandResult::ok(NavigationInfo::capture(state, None)),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

pub fn forward(state: &AppState) -> CommandResult<NavigationInfo> {
    match state.router().forward() {
        Ok(()) => CommandResult::ok(NavigationInfo::capture(state, None)),
        Err(e) => CommandResult::err(e.to_string()),
    }
}
