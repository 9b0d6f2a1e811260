//! Stream event classification for agent output.
//!
//! A headless agent emits one JSON record per stdout line. This module turns
//! each raw line into a [`StreamEvent`]: a tagged variant carrying only the
//! fields relevant for progress reporting. Classification is total: a line
//! that fails to parse, or parses to an unexpected shape, becomes
//! [`StreamEvent::Unrecognized`] rather than an error, so a malformed line
//! can never abort the consumption loop.
//!
//! The classifier is a pure function: no I/O, no state. Printing is handled
//! separately in [`crate::agent::progress`].

use serde_json::Value;

/// Maximum number of tool names carried by a `SystemInit` event.
pub const TOOL_LIST_LIMIT: usize = 5;

/// Maximum characters carried in a tool-result snippet.
pub const SNIPPET_LIMIT: usize = 100;

/// Maximum characters of a shell command carried in a tool-use summary.
pub const COMMAND_SUMMARY_LIMIT: usize = 50;

/// One classified record from the agent's output stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Session initialization: model identity and available tools.
    SystemInit {
        /// Model name, "unknown" when absent.
        model: String,
        /// Up to the first [`TOOL_LIST_LIMIT`] tool names.
        tools: Vec<String>,
        /// Whether more tools existed than were carried.
        tools_truncated: bool,
    },

    /// An assistant message: ordered text and tool-use segments.
    Assistant { segments: Vec<Segment> },

    /// A tool result echoed back through a user message.
    ToolResult {
        status: ToolResultStatus,
        /// First [`SNIPPET_LIMIT`] characters of the result text.
        snippet: String,
        /// Whether the original text was longer than the snippet.
        truncated: bool,
    },

    /// The final result record for the session.
    TaskResult(TaskResult),

    /// A line that is not valid JSON, or is structurally unexpected.
    Unrecognized { raw: String },
}

/// One segment of an assistant message.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A text block, already trimmed. Whitespace-only blocks are omitted at
    /// classification; the surrounding event is still returned.
    Text { body: String },

    /// A tool invocation.
    ToolUse {
        /// Tool name, "unknown" when absent.
        tool: String,
        /// Short tool-specific summary: the file base name for file tools,
        /// the command (truncated with an ellipsis) for the shell tool.
        summary: Option<String>,
    },
}

/// Coarse classification of a tool result's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolResultStatus {
    /// Text mentions "successfully".
    Success,
    /// Text mentions "error" or "failed".
    Failure,
    /// Anything else.
    Neutral,
}

/// The agent's final verdict for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    Success {
        /// Result text, if the agent reported one.
        result: Option<String>,
        cost_usd: f64,
        duration_ms: u64,
    },
    Failure {
        error: String,
    },
}

/// Classify one raw output line into a [`StreamEvent`].
///
/// Never panics and never returns an error: unparseable or unexpected input
/// yields `Unrecognized`. Classifying the same line twice yields structurally
/// equal events.
pub fn classify(raw_line: &str) -> StreamEvent {
    let value: Value = match serde_json::from_str(raw_line) {
        Ok(v) => v,
        Err(_) => return unrecognized(raw_line),
    };

    match value.get("type").and_then(Value::as_str) {
        Some("system") => classify_system(&value, raw_line),
        Some("assistant") => classify_assistant(&value),
        Some("user") => classify_user(&value, raw_line),
        Some("result") => classify_result(&value),
        _ => unrecognized(raw_line),
    }
}

fn unrecognized(raw_line: &str) -> StreamEvent {
    StreamEvent::Unrecognized {
        raw: raw_line.to_string(),
    }
}

fn classify_system(value: &Value, raw_line: &str) -> StreamEvent {
    if value.get("subtype").and_then(Value::as_str) != Some("init") {
        return unrecognized(raw_line);
    }

    let model = value
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    let all_tools: Vec<String> = value
        .get("tools")
        .and_then(Value::as_array)
        .map(|tools| {
            tools
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let tools_truncated = all_tools.len() > TOOL_LIST_LIMIT;
    let tools = all_tools.into_iter().take(TOOL_LIST_LIMIT).collect();

    StreamEvent::SystemInit {
        model,
        tools,
        tools_truncated,
    }
}

fn classify_assistant(value: &Value) -> StreamEvent {
    let content = value
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_array);

    let mut segments = Vec::new();

    if let Some(items) = content {
        for item in items {
            match item.get("type").and_then(Value::as_str) {
                Some("text") => {
                    let body = item
                        .get("text")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .trim();
                    if !body.is_empty() {
                        segments.push(Segment::Text {
                            body: body.to_string(),
                        });
                    }
                }
                Some("tool_use") => {
                    let tool = item
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string();
                    let summary = tool_summary(&tool, item.get("input"));
                    segments.push(Segment::ToolUse { tool, summary });
                }
                _ => {}
            }
        }
    }

    StreamEvent::Assistant { segments }
}

/// Build the short per-tool summary for a `tool_use` segment.
///
/// File-mutating tools summarize as the file's base name; the shell tool
/// summarizes as the command truncated to [`COMMAND_SUMMARY_LIMIT`]
/// characters with an ellipsis marker when longer.
fn tool_summary(tool: &str, input: Option<&Value>) -> Option<String> {
    let input = input?;

    match tool {
        "Write" | "Edit" | "Read" => {
            let file_path = input.get("file_path").and_then(Value::as_str)?;
            if file_path.is_empty() {
                return None;
            }
            let base = std::path::Path::new(file_path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file_path.to_string());
            Some(base)
        }
        "Bash" => {
            let command = input.get("command").and_then(Value::as_str)?;
            if command.is_empty() {
                return None;
            }
            let (head, truncated) = take_chars(command, COMMAND_SUMMARY_LIMIT);
            Some(if truncated { format!("{}...", head) } else { head })
        }
        _ => None,
    }
}

fn classify_user(value: &Value, raw_line: &str) -> StreamEvent {
    let content = value
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_array);

    let Some(items) = content else {
        return unrecognized(raw_line);
    };

    for item in items {
        if item.get("type").and_then(Value::as_str) != Some("tool_result") {
            continue;
        }

        let text = tool_result_text(item.get("content"));
        let status = classify_result_text(&text);
        let (snippet, truncated) = take_chars(&text, SNIPPET_LIMIT);

        return StreamEvent::ToolResult {
            status,
            snippet,
            truncated,
        };
    }

    unrecognized(raw_line)
}

/// Extract the text of a tool result's content, which may be a plain string
/// or a list of text blocks.
fn tool_result_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Classify a tool result's text by case-insensitive substring match.
fn classify_result_text(text: &str) -> ToolResultStatus {
    let lower = text.to_lowercase();
    if lower.contains("successfully") {
        ToolResultStatus::Success
    } else if lower.contains("error") || lower.contains("failed") {
        ToolResultStatus::Failure
    } else {
        ToolResultStatus::Neutral
    }
}

fn classify_result(value: &Value) -> StreamEvent {
    if value.get("subtype").and_then(Value::as_str) == Some("success") {
        let result = value
            .get("result")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let cost_usd = value
            .get("cost_usd")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let duration_ms = value
            .get("duration_ms")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        StreamEvent::TaskResult(TaskResult::Success {
            result,
            cost_usd,
            duration_ms,
        })
    } else {
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();

        StreamEvent::TaskResult(TaskResult::Failure { error })
    }
}

/// Take at most `limit` characters from `s`, reporting whether anything was
/// cut. Operates on characters, not bytes, so multi-byte input cannot split
/// a code point.
fn take_chars(s: &str, limit: usize) -> (String, bool) {
    let mut chars = s.char_indices();
    match chars.nth(limit) {
        Some((byte_idx, _)) => (s[..byte_idx].to_string(), true),
        None => (s.to_string(), false),
    }
}
