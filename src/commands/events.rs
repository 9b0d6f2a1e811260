//! Implementation of the `drover events` command.
//!
//! Prints the tail of the run log. Lines that fail to parse are shown raw so
//! a damaged log is still inspectable.

use crate::cli::EventsArgs;
use crate::context::SessionContext;
use crate::error::{DroverError, Result};
use crate::events::Event;

/// Execute the `drover events` command.
pub fn cmd_events(args: EventsArgs) -> Result<()> {
    let ctx = SessionContext::resolve()?;
    let events_file = ctx.events_path();

    if !events_file.exists() {
        println!("No run events recorded.");
        return Ok(());
    }

    let content = std::fs::read_to_string(&events_file).map_err(|e| {
        DroverError::UserError(format!(
            "failed to read events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(args.tail);

    for line in &lines[start..] {
        println!("{}", format_event_line(line));
    }

    Ok(())
}

/// Format one log line for display, falling back to the raw line when it
/// does not parse as an event.
fn format_event_line(line: &str) -> String {
    match serde_json::from_str::<Event>(line) {
        Ok(event) => format!(
            "{}  {:<9} {}  {}",
            event.ts.format("%Y-%m-%d %H:%M:%S UTC"),
            event.action.to_string(),
            event.actor,
            event.details
        ),
        Err(_) => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventAction;
    use serde_json::json;

    #[test]
    fn format_valid_event_line() {
        let event = Event::new(EventAction::Dispatch).with_details(json!({"agent": "test"}));
        let line = event.to_ndjson_line().unwrap();

        let formatted = format_event_line(&line);
        assert!(formatted.contains("dispatch"));
        assert!(formatted.contains("UTC"));
        assert!(formatted.contains("test"));
    }

    #[test]
    fn format_unparseable_line_falls_back_to_raw() {
        assert_eq!(format_event_line("not json"), "not json");
    }
}
