//! Shell commands
//!
//! One command per line:
//! - `navigate <fragment> [--replace] [--no-trigger]`
//! - `hash <fragment>`, `back`, `forward`
//! - `state`, `entries`, `visits`, `root`, `get <key>`, `title <title>`
//! - `quit`

pub mod inspect;
pub mod navigation;

use serde::Serialize;

use hashroute_core::NavigateOptions;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Navigate {
        fragment: String,
        options: NavigateOptions,
    },
    Hash(String),
    Back,
    Forward,
    State,
    Entries,
    Visits,
    Root,
    Get(String),
    Title(String),
    Quit,
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "navigate" | "nav" | "n" => Self::parse_navigate(rest)?,
            "hash" => ShellCommand::Hash(rest.to_string()),
            "back" | "b" => ShellCommand::Back,
            "forward" | "f" => ShellCommand::Forward,
            "state" | "s" => ShellCommand::State,
            "entries" => ShellCommand::Entries,
            "visits" => ShellCommand::Visits,
            "root" => ShellCommand::Root,
            "get" if !rest.is_empty() => ShellCommand::Get(rest.to_string()),
            "get" => return Err("Usage: get <key>".to_string()),
            "title" => ShellCommand::Title(rest.to_string()),
            "quit" | "exit" | "q" => ShellCommand::Quit,
            _ => return Err(format!("Unknown command: {}", name)),
        };

        Ok(Some(command))
    }

    fn parse_navigate(args: &str) -> Result<Self, String> {
        let mut fragment = None;
        let mut options = NavigateOptions::new();

        for arg in args.split_whitespace() {
            match arg {
                "--replace" => options = options.replace(),
                "--no-trigger" => options = options.without_trigger(),
                flag if flag.starts_with("--") => {
                    return Err(format!("Unknown flag: {}", flag));
                }
                _ if fragment.is_some() => {
                    return Err("navigate takes a single fragment".to_string());
                }
                _ => fragment = Some(arg.to_string()),
            }
        }

        Ok(ShellCommand::Navigate {
            fragment: fragment.unwrap_or_default(),
            options,
        })
    }
}

/// Run `command` and render its result as one JSON line
pub fn execute(state: &AppState, command: ShellCommand) -> serde_json::Result<String> {
    tracing::debug!(?command, "Executing shell command");

    match command {
        ShellCommand::Navigate { fragment, options } => {
            serde_json::to_string(&navigation::navigate(state, &fragment, options))
        }
        ShellCommand::Hash(fragment) => {
            serde_json::to_string(&navigation::edit_hash(state, &fragment))
        }
        ShellCommand::Back => serde_json::to_string(&navigation::back(state)),
        ShellCommand::Forward => serde_json::to_string(&navigation::forward(state)),
        ShellCommand::State => serde_json::to_string(&inspect::current_state(state)),
        ShellCommand::Entries => serde_json::to_string(&inspect::entries(state)),
        ShellCommand::Visits => serde_json::to_string(&inspect::visits(state)),
        ShellCommand::Root => serde_json::to_string(&inspect::absolute_root(state)),
        ShellCommand::Get(key) => serde_json::to_string(&inspect::get_state(state, &key)),
        ShellCommand::Title(title) => serde_json::to_string(&inspect::set_title(state, &title)),
        ShellCommand::Quit => serde_json::to_string(&CommandResult::ok(())),
    }
}
