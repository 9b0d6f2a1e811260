//! CLI argument parsing for drover.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};

/// Drover: headless driver for CLI coding agents.
///
/// Drover launches a coding agent as a subprocess in the current directory,
/// streams its progress live, enforces a timeout, and reads back the summary
/// the agent was instructed to write.
#[derive(Parser, Debug)]
#[command(name = "drover")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for drover.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a task with the configured agent.
    ///
    /// Prompts for confirmation (the agent runs with unsupervised
    /// permissions), then streams progress until the agent exits.
    Run(RunArgs),

    /// Check that the agent is ready to run in this directory.
    ///
    /// Read-only: verifies the agent binary is on PATH and, when --project
    /// is given, that the working directory matches the expected project.
    Check(CheckArgs),

    /// Show recent run events from the audit log.
    Events(EventsArgs),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Natural-language instruction for the agent.
    pub instruction: String,

    /// Result artifact filename (defaults to the configured output_file).
    #[arg(long)]
    pub output_file: Option<String>,

    /// Timeout in seconds (overrides the configured timeout_seconds).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Skip the confirmation prompt (counts as an affirmative answer).
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Expected project name to verify against the working directory.
    #[arg(long)]
    pub project: Option<String>,
}

/// Arguments for the `events` command.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Show the last N events.
    #[arg(long, default_value_t = 10)]
    pub tail: usize,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
