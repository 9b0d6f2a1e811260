//! Command implementations for drover.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod check;
mod events;
mod run;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::cmd_run(args),
        Command::Check(args) => check::cmd_check(args),
        Command::Events(args) => events::cmd_events(args),
    }
}
