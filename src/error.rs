//! Error types for the drover CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Timeouts get their own variant: an agent that blows the deadline is killed
//! first and then surfaced distinctly, never folded into a generic failure.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for drover operations.
///
/// Each variant maps to a specific exit code.
#[derive(Error, Debug)]
pub enum DroverError {
    /// User provided invalid arguments or the environment is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// The agent binary could not be started at all (e.g., not installed).
    ///
    /// Distinct from a non-zero exit: the process never ran. The execution
    /// core converts this into a failed outcome with the same message.
    #[error("{0}")]
    Launch(String),

    /// The agent run finished without producing a successful outcome.
    #[error("agent run failed: {0}")]
    AgentFailure(String),

    /// The agent did not exit within the configured timeout.
    ///
    /// The supervisor kills the process before this error propagates, so a
    /// timeout never leaves an orphaned agent behind.
    #[error("{agent} did not complete within {timeout_seconds} seconds")]
    AgentTimeout { agent: String, timeout_seconds: u64 },
}

impl DroverError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DroverError::UserError(_) => exit_codes::USER_ERROR,
            DroverError::Launch(_) => exit_codes::AGENT_FAILURE,
            DroverError::AgentFailure(_) => exit_codes::AGENT_FAILURE,
            DroverError::AgentTimeout { .. } => exit_codes::AGENT_TIMEOUT,
        }
    }
}

/// Result type alias for drover operations.
pub type Result<T> = std::result::Result<T, DroverError>;
