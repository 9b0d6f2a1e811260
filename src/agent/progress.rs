//! Progress rendering for classified stream events.
//!
//! Rendering is the side-effecting consumer of the classifier: one call per
//! event, in the order events arrive, while the agent is still running. It
//! must never panic; when a field is absent the output degrades to whatever
//! is available (for `Unrecognized`, the raw line itself).

use crate::agent::stream::{Segment, StreamEvent, TaskResult, ToolResultStatus};

/// Print the progress lines for one event to stdout.
pub fn render(event: &StreamEvent) {
    for line in render_lines(event) {
        println!("{}", line);
    }
}

/// Build the progress lines for one event.
///
/// Split from [`render`] so tests can assert on output without capturing
/// stdout. An event can render to zero lines (e.g. an assistant message
/// whose only text was whitespace).
pub fn render_lines(event: &StreamEvent) -> Vec<String> {
    let mut lines = Vec::new();

    match event {
        StreamEvent::SystemInit {
            model,
            tools,
            tools_truncated,
        } => {
            lines.push("Initializing agent session...".to_string());
            lines.push(format!("   Model: {}", model));
            if !tools.is_empty() {
                let suffix = if *tools_truncated { "..." } else { "" };
                lines.push(format!("   Available tools: {}{}", tools.join(", "), suffix));
            }
        }

        StreamEvent::Assistant { segments } => {
            for segment in segments {
                match segment {
                    Segment::Text { body } => {
                        lines.push(String::new());
                        lines.push(body.clone());
                    }
                    Segment::ToolUse { tool, summary } => {
                        lines.push(String::new());
                        lines.push(format!("Using tool: {}", tool));
                        if let Some(summary) = summary
                            && let Some(verb) = tool_verb(tool)
                        {
                            lines.push(format!("   {}: {}", verb, summary));
                        }
                    }
                }
            }
        }

        StreamEvent::ToolResult {
            status,
            snippet,
            truncated,
        } => {
            let suffix = if *truncated { "..." } else { "" };
            match status {
                ToolResultStatus::Success => lines.push("   Success".to_string()),
                ToolResultStatus::Failure => {
                    lines.push(format!("   Error: {}{}", snippet, suffix));
                }
                ToolResultStatus::Neutral => {
                    if !snippet.is_empty() {
                        lines.push(format!("   {}{}", snippet, suffix));
                    }
                }
            }
        }

        StreamEvent::TaskResult(result) => match result {
            TaskResult::Success {
                result,
                cost_usd,
                duration_ms,
            } => {
                lines.push(String::new());
                lines.push("Task completed successfully!".to_string());
                if let Some(result) = result {
                    lines.push(format!("   Result: {}", result));
                }
                lines.push(format!(
                    "   Duration: {:.1}s, Cost: ${:.4}",
                    *duration_ms as f64 / 1000.0,
                    cost_usd
                ));
            }
            TaskResult::Failure { error } => {
                lines.push(String::new());
                lines.push(format!("Task failed: {}", error));
            }
        },

        StreamEvent::Unrecognized { raw } => {
            lines.push(format!("[output] {}", raw));
        }
    }

    lines
}

/// Display verb for a tool's summary line.
fn tool_verb(tool: &str) -> Option<&'static str> {
    match tool {
        "Write" => Some("Creating file"),
        "Edit" => Some("Editing file"),
        "Read" => Some("Reading file"),
        "Bash" => Some("Running"),
        _ => None,
    }
}
