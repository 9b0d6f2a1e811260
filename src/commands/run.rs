//! Implementation of the `drover run` command.
//!
//! Resolves the session, loads settings, gates on operator confirmation, and
//! drives one agent execution end to end. The outcome (and any timeout) is
//! recorded in the run log; log failures warn but never fail the run.

use crate::agent::{ExecutionOutcome, HeadlessAgent, TaskRequest};
use crate::cli::RunArgs;
use crate::config::Settings;
use crate::context::SessionContext;
use crate::error::{DroverError, Result};
use crate::events::{Event, EventAction, append_event};
use serde_json::json;
use std::io::{self, BufRead, Write};

/// Execute the `drover run` command.
pub fn cmd_run(args: RunArgs) -> Result<()> {
    let ctx = SessionContext::resolve()?;
    let settings = Settings::load(ctx.settings_path())?;

    let timeout = settings.effective_timeout(args.timeout);
    let output_file = args
        .output_file
        .unwrap_or_else(|| settings.output_file.clone());

    let agent = HeadlessAgent::new(&ctx, &settings, timeout);
    let task = TaskRequest::new(args.instruction.as_str(), output_file.as_str());

    println!("Executing task with {}...", agent.agent_name());
    println!();
    println!("  Directory: {}", ctx.root.display());
    println!("  Artifact:  {}", output_file);
    println!("  Timeout:   {}s", timeout);

    log_event(
        &ctx,
        Event::new(EventAction::Dispatch).with_details(json!({
            "agent": agent.agent_name(),
            "timeout_seconds": timeout,
            "output_file": output_file,
        })),
    );

    let mut approved = false;
    let outcome = agent.execute(&task, |warning| {
        let ok = prompt_operator(warning, args.yes);
        approved = ok;
        ok
    });

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err @ DroverError::AgentTimeout { .. }) => {
            log_event(
                &ctx,
                Event::new(EventAction::Timeout).with_details(json!({
                    "agent": agent.agent_name(),
                    "timeout_seconds": timeout,
                })),
            );
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    if !approved {
        log_event(&ctx, Event::new(EventAction::Declined));
    } else {
        log_event(
            &ctx,
            Event::new(EventAction::Complete).with_details(json!({
                "agent": agent.agent_name(),
                "succeeded": outcome.succeeded,
            })),
        );
    }

    report_outcome(outcome)
}

/// Print the outcome and convert a failure into the matching error.
fn report_outcome(outcome: ExecutionOutcome) -> Result<()> {
    println!();
    if outcome.succeeded {
        println!("Agent run complete.");
        println!();
        println!("{}", outcome.content);
        Ok(())
    } else {
        let message = outcome
            .error_message
            .unwrap_or_else(|| "agent run failed without an explanation".to_string());
        Err(DroverError::AgentFailure(message))
    }
}

/// Ask the operator to approve an unsupervised run.
///
/// `--yes` is the affirmative fast path; otherwise a y/n answer is read from
/// the controlling terminal. Anything but an explicit yes declines.
fn prompt_operator(warning: &str, assume_yes: bool) -> bool {
    println!();
    println!("WARNING: {}", warning);

    if assume_yes {
        println!("Proceeding (--yes).");
        return true;
    }

    print!("Do you want to continue? (y/n): ");
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }

    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Append a run event, warning on failure instead of failing the run.
fn log_event(ctx: &SessionContext, event: Event) {
    if let Err(e) = append_event(ctx, &event) {
        eprintln!("Warning: failed to log {} event: {}", event.action, e);
    }
}
