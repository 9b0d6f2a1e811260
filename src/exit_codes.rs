//! Exit code constants for the drover CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid settings, failed readiness check)
//! - 2: Agent run failure (declined, launch failure, non-zero exit, missing artifact)
//! - 3: Agent timeout (the process was killed at the deadline)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid settings, or a failed readiness check.
pub const USER_ERROR: i32 = 1;

/// Agent run failure: the run finished but did not produce a successful outcome.
pub const AGENT_FAILURE: i32 = 2;

/// Agent timeout: the agent did not exit within the configured deadline.
pub const AGENT_TIMEOUT: i32 = 3;
