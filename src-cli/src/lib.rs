//! hashroute shell
//!
//! Reads one command per line from stdin and answers each with a JSON
//! `CommandResult` on stdout. Logs go to stderr.

pub mod commands;
pub mod state;

use std::io::{BufRead, Write};

use commands::{CommandResult, ShellCommand};
use state::AppState;

pub fn run() -> anyhow::Result<()> {
    // Initialize logging
    hashroute_core::init_logging();

    let state = AppState::new()?;
    let routed = state.initialize()?;

    tracing::info!(
        routed,
        root = %state.router().absolute_root(),
        "hashroute shell started"
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;

        let response = match ShellCommand::parse(&line) {
            Ok(None) => continue,
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => commands::execute(&state, command)?,
            Err(e) => serde_json::to_string(&CommandResult::<()>::err(e))?,
        };

        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    state.router().stop();
    tracing::info!("hashroute shell stopped");

    Ok(())
}
