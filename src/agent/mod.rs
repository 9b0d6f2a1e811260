//! Agent execution subsystem for drover.
//!
//! This module provides the headless-driving core:
//!
//! - **Stream**: classification of the agent's line-delimited JSON output
//! - **Progress**: live rendering of classified events
//! - **Supervisor**: subprocess lifecycle with streaming, timeout, and kill
//! - **Artifact**: result artifact access
//! - **Outcome**: exit-code/artifact reconciliation
//! - **Headless**: the execution core composing the above, plus readiness
//!   probes
//!
//! # Design Philosophy
//!
//! The agent is an opaque CLI subprocess: drover speaks to it only through
//! arguments, the stream-json protocol on stdout, and the result artifact it
//! leaves behind. Any agent tool that honors those three surfaces can be
//! driven without changes here.

pub mod artifact;
pub mod headless;
pub mod outcome;
pub mod progress;
pub mod stream;
pub mod supervisor;

// Re-export public API
pub use headless::{HeadlessAgent, Readiness, TaskRequest};
pub use outcome::{ExecutionOutcome, decide};
pub use stream::{Segment, StreamEvent, TaskResult, ToolResultStatus, classify};
pub use supervisor::{AgentProcess, LineRead};
