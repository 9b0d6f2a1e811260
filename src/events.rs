//! Run-event logging for drover.
//!
//! Each agent run appends events to an NDJSON log (one JSON object per line)
//! at `.drover/events.ndjson` so that unattended runs leave an auditable
//! trace: what was dispatched, by whom, and how it ended.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: the action recorded (dispatch, complete, declined, timeout)
//! - `actor`: the owner string (e.g., `user@HOST`)
//! - `details`: freeform object with action-specific details
//!
//! Logging around a run is best-effort: a failed append warns on stderr and
//! never fails the run itself.

use crate::context::SessionContext;
use crate::error::{DroverError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions that can be recorded in the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Agent subprocess dispatched.
    Dispatch,
    /// Agent run finished (successfully or not; see details).
    Complete,
    /// Operator declined the confirmation prompt; nothing was spawned.
    Declined,
    /// Agent was killed at the deadline.
    Timeout,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Dispatch => write!(f, "dispatch"),
            EventAction::Complete => write!(f, "complete"),
            EventAction::Declined => write!(f, "declined"),
            EventAction::Timeout => write!(f, "timeout"),
        }
    }
}

/// An event record for the run log.
///
/// Events are serialized as single-line JSON objects and appended to
/// the events.ndjson file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was recorded.
    pub action: EventAction,

    /// The actor who ran the command (e.g., `user@HOST`).
    pub actor: String,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            DroverError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Get the actor string for event metadata.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the run log.
///
/// The state directory and the log file are created on first use. Each
/// append results in one line with a trailing newline.
pub fn append_event(ctx: &SessionContext, event: &Event) -> Result<()> {
    let events_file = ctx.events_path();

    let json_line = event.to_ndjson_line()?;

    let state_dir = ctx.state_dir();
    if !state_dir.exists() {
        fs::create_dir_all(&state_dir).map_err(|e| {
            DroverError::UserError(format!(
                "failed to create state directory '{}': {}",
                state_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            DroverError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        DroverError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_context() -> (TempDir, SessionContext) {
        let temp_dir = TempDir::new().unwrap();
        let ctx = SessionContext::resolve_from(temp_dir.path()).unwrap();
        (temp_dir, ctx)
    }

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::Dispatch);

        assert_eq!(event.action, EventAction::Dispatch);
        assert!(!event.actor.is_empty());
        // Timestamp should be recent (within last minute)
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_with_details() {
        let event = Event::new(EventAction::Complete)
            .with_details(json!({"succeeded": true, "exit_code": 0}));

        assert_eq!(event.details["succeeded"], true);
        assert_eq!(event.details["exit_code"], 0);
    }

    #[test]
    fn test_event_serialization() {
        let event =
            Event::new(EventAction::Timeout).with_details(json!({"timeout_seconds": 600}));

        let json_line = event.to_ndjson_line().unwrap();

        // Should be valid JSON and single-line
        let parsed: Event = serde_json::from_str(&json_line).unwrap();
        assert_eq!(parsed.action, EventAction::Timeout);
        assert!(!json_line.contains('\n'));
    }

    #[test]
    fn test_event_action_serialization_is_snake_case() {
        let event = Event::new(EventAction::Declined);
        let json_line = event.to_ndjson_line().unwrap();
        assert!(json_line.contains("\"declined\""));
    }

    #[test]
    fn test_append_event_creates_file_and_dir() {
        let (_temp_dir, ctx) = create_test_context();
        let events_file = ctx.events_path();

        assert!(!ctx.state_dir().exists());
        assert!(!events_file.exists());

        let event = Event::new(EventAction::Dispatch).with_details(json!({"agent": "test"}));
        append_event(&ctx, &event).unwrap();

        assert!(events_file.exists());

        let content = fs::read_to_string(&events_file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);

        let parsed: Event = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.action, EventAction::Dispatch);
    }

    #[test]
    fn test_append_event_multiple_lines() {
        let (_temp_dir, ctx) = create_test_context();

        append_event(&ctx, &Event::new(EventAction::Dispatch)).unwrap();
        append_event(&ctx, &Event::new(EventAction::Complete)).unwrap();

        let content = fs::read_to_string(ctx.events_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Event = serde_json::from_str(lines[0]).unwrap();
        let second: Event = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.action, EventAction::Dispatch);
        assert_eq!(second.action, EventAction::Complete);
    }

    #[test]
    fn test_append_event_trailing_newline() {
        let (_temp_dir, ctx) = create_test_context();

        append_event(&ctx, &Event::new(EventAction::Dispatch)).unwrap();

        let content = fs::read_to_string(ctx.events_path()).unwrap();
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_actor_string_contains_at() {
        let actor = actor_string();
        assert!(actor.contains('@'));
        assert!(!actor.is_empty());
    }

    #[test]
    fn test_event_action_display() {
        assert_eq!(format!("{}", EventAction::Dispatch), "dispatch");
        assert_eq!(format!("{}", EventAction::Complete), "complete");
        assert_eq!(format!("{}", EventAction::Declined), "declined");
        assert_eq!(format!("{}", EventAction::Timeout), "timeout");
    }
}
