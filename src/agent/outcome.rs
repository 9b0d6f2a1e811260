//! Execution outcomes and exit-code/artifact reconciliation.
//!
//! An agent run ends in exactly one [`ExecutionOutcome`]. The reconciler
//! combines the subprocess exit code with the result artifact: a zero exit
//! only counts as success once the artifact has actually been read back. A
//! zero exit with a missing artifact is a failure and is never silently
//! upgraded to success.

use crate::agent::artifact::read_artifact;
use std::path::Path;

/// Normalized result of one agent execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Whether the run succeeded end to end.
    pub succeeded: bool,
    /// The result artifact's text; empty unless `succeeded`.
    pub content: String,
    /// Why the run failed; always present unless `succeeded`.
    pub error_message: Option<String>,
}

impl ExecutionOutcome {
    /// A successful outcome carrying the artifact text.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            content: content.into(),
            error_message: None,
        }
    }

    /// A failed outcome. Every failure carries an explanation.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            content: String::new(),
            error_message: Some(message.into()),
        }
    }
}

/// Decide the overall verdict from the exit code, captured stderr, and the
/// result artifact.
///
/// - Exit 0: read the artifact; an unreadable artifact is a reconciliation
///   failure with a descriptive message.
/// - Non-zero exit: failure carrying stderr, falling back to a generic
///   return-code message when stderr is empty.
pub fn decide(exit_code: i32, stderr: &str, artifact: &Path) -> ExecutionOutcome {
    if exit_code == 0 {
        match read_artifact(artifact) {
            Ok(content) => ExecutionOutcome::success(content),
            Err(e) => ExecutionOutcome::failure(e.to_string()),
        }
    } else {
        let stderr = stderr.trim();
        if stderr.is_empty() {
            ExecutionOutcome::failure(format!("command failed with return code {}", exit_code))
        } else {
            ExecutionOutcome::failure(stderr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn zero_exit_with_artifact_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = temp_dir.path().join("agent_summary.md");
        std::fs::write(&artifact, "X").unwrap();

        let outcome = decide(0, "", &artifact);
        assert!(outcome.succeeded);
        assert_eq!(outcome.content, "X");
        assert!(outcome.error_message.is_none());
    }

    #[test]
    fn zero_exit_with_missing_artifact_fails() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = temp_dir.path().join("agent_summary.md");

        let outcome = decide(0, "", &artifact);
        assert!(!outcome.succeeded);
        assert!(outcome.content.is_empty());
        let message = outcome.error_message.unwrap();
        assert!(!message.is_empty());
        assert!(message.contains("agent_summary.md"));
    }

    #[test]
    fn nonzero_exit_carries_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = temp_dir.path().join("agent_summary.md");

        let outcome = decide(1, "permission denied\n", &artifact);
        assert!(!outcome.succeeded);
        assert_eq!(outcome.error_message.as_deref(), Some("permission denied"));
    }

    #[test]
    fn nonzero_exit_with_empty_stderr_uses_generic_message() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = temp_dir.path().join("agent_summary.md");

        let outcome = decide(2, "  \n", &artifact);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("command failed with return code 2")
        );
    }

    #[test]
    fn nonzero_exit_ignores_existing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = temp_dir.path().join("agent_summary.md");
        std::fs::write(&artifact, "stale").unwrap();

        let outcome = decide(1, "boom", &artifact);
        assert!(!outcome.succeeded);
        assert!(outcome.content.is_empty());
    }

    #[test]
    fn outcome_invariants() {
        let success = ExecutionOutcome::success("text");
        assert!(success.succeeded);
        assert!(success.error_message.is_none());

        let failure = ExecutionOutcome::failure("why");
        assert!(!failure.succeeded);
        assert!(failure.content.is_empty());
        assert_eq!(failure.error_message.as_deref(), Some("why"));
    }
}
