//! Headless agent execution core.
//!
//! Composes the supervisor, classifier, renderer, and reconciler into the
//! single public operation: run one task to completion and return a
//! normalized [`ExecutionOutcome`]. The agent runs with
//! `--dangerously-skip-permissions`, so an explicit operator confirmation
//! gates every launch.
//!
//! The readiness probes (`availability`, `project_directory_check`) are
//! read-only and independent of `execute`: they verify nothing mutates and
//! spawn no long-running subprocess.

use crate::agent::outcome::{ExecutionOutcome, decide};
use crate::agent::progress;
use crate::agent::stream::classify;
use crate::agent::supervisor::{AgentProcess, LineRead};
use crate::config::Settings;
use crate::context::SessionContext;
use crate::error::{DroverError, Result};

/// One task to execute: the instruction and where the agent should leave its
/// summary. Constructed by the caller, consumed once per execution.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    /// Natural-language instruction for the agent.
    pub instruction: String,
    /// Result artifact path, relative to the working directory.
    pub output_file: String,
}

impl TaskRequest {
    pub fn new(instruction: impl Into<String>, output_file: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            output_file: output_file.into(),
        }
    }
}

/// Result of a read-only readiness probe.
#[derive(Debug, Clone)]
pub struct Readiness {
    pub ready: bool,
    pub message: String,
}

/// The execution core for one headless agent.
///
/// Holds the session context and settings by reference; one instance drives
/// at most one subprocess at a time. Note that nothing prevents two separate
/// drover invocations from racing in the same directory; the confirmation
/// gate and the `check` command are the informal guard, not a lock.
pub struct HeadlessAgent<'a> {
    ctx: &'a SessionContext,
    settings: &'a Settings,
    timeout_seconds: u64,
}

impl<'a> HeadlessAgent<'a> {
    /// Create the execution core with an already-resolved timeout.
    pub fn new(ctx: &'a SessionContext, settings: &'a Settings, timeout_seconds: u64) -> Self {
        Self {
            ctx,
            settings,
            timeout_seconds,
        }
    }

    /// The agent's display name.
    pub fn agent_name(&self) -> &str {
        &self.settings.agent.name
    }

    /// The effective timeout for this run in seconds.
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Execute a task to completion.
    ///
    /// `confirm` is invoked exactly once with a warning describing the
    /// unsupervised permissions; returning `false` short-circuits with a
    /// cancelled outcome and nothing is spawned. A spawn failure becomes a
    /// failed outcome (the binary never ran). A timeout propagates as
    /// [`DroverError::AgentTimeout`] after the process has been killed.
    pub fn execute<F>(&self, task: &TaskRequest, confirm: F) -> Result<ExecutionOutcome>
    where
        F: FnOnce(&str) -> bool,
    {
        let warning = format!(
            "This will execute {} with --dangerously-skip-permissions,\n\
             giving it full access to run commands in '{}'.",
            self.settings.agent.name,
            self.ctx.root.display()
        );
        if !confirm(&warning) {
            return Ok(ExecutionOutcome::failure(
                "cancelled by operator: execution with unsupervised permissions was not approved",
            ));
        }

        let prompt = build_prompt(&task.instruction, &task.output_file);
        let mut args = vec![
            "-p".to_string(),
            prompt,
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--dangerously-skip-permissions".to_string(),
        ];
        args.extend(self.settings.extra_agent_args()?);

        let mut process = match AgentProcess::spawn(
            &self.settings.agent.name,
            &self.settings.agent.binary,
            &args,
            &self.ctx.root,
            self.timeout_seconds,
        ) {
            Ok(process) => process,
            Err(DroverError::Launch(message)) => return Ok(ExecutionOutcome::failure(message)),
            Err(e) => return Err(e),
        };

        println!(
            "Streaming {} output (pid {})...",
            self.settings.agent.name,
            process.id()
        );

        loop {
            match process.next_line()? {
                LineRead::Eof => break,
                LineRead::Line(line) => {
                    let trimmed = line.trim();
                    // Empty lines are buffering artifacts; they stay in the
                    // transcript but carry no protocol record.
                    if trimmed.is_empty() {
                        continue;
                    }
                    progress::render(&classify(trimmed));
                }
            }
        }

        let exit_code = process.wait()?;
        let stderr = process.read_stderr();
        let artifact = self.ctx.artifact_path(&task.output_file);

        Ok(decide(exit_code, &stderr, &artifact))
    }

    /// Check that the agent binary resolves on PATH.
    pub fn availability(&self) -> Readiness {
        match which::which(&self.settings.agent.binary) {
            Ok(path) => Readiness {
                ready: true,
                message: format!(
                    "{} is available at {}",
                    self.settings.agent.name,
                    path.display()
                ),
            },
            Err(_) => Readiness {
                ready: false,
                message: format!(
                    "{} not found on PATH (binary '{}')",
                    self.settings.agent.name, self.settings.agent.binary
                ),
            },
        }
    }

    /// Check that the working directory looks like the expected project.
    ///
    /// The expected name must appear (case-insensitively) in the working
    /// directory's base name.
    pub fn project_directory_check(&self, expected_project: &str) -> Readiness {
        let expected = expected_project.trim();
        if expected.is_empty() {
            return Readiness {
                ready: false,
                message: "no project name given, cannot verify working directory".to_string(),
            };
        }

        let current = &self.ctx.project_name;
        if current.to_lowercase().contains(&expected.to_lowercase()) {
            Readiness {
                ready: true,
                message: format!("working directory '{}' matches project '{}'", current, expected),
            }
        } else {
            Readiness {
                ready: false,
                message: format!(
                    "working directory '{}' does not match expected project '{}'",
                    current, expected
                ),
            }
        }
    }
}

/// Augment the caller's instruction with the fixed persistence directive.
///
/// The agent is told to save its summary to the artifact and to leave no
/// incidental documentation files behind.
fn build_prompt(instruction: &str, output_file: &str) -> String {
    format!(
        "{instruction}\n\n\
         After completing the above task, save a comprehensive summary of everything you did \
         to a file called '{output_file}' in the current directory. Include:\n\
         - All changes made\n\
         - Explanations of what was done\n\n\
         IMPORTANT: Do NOT create or update any documentation files (such as README.md or docs/*) \
         unless explicitly asked to in the original task. If a temporary documentation file helps \
         you complete the task, delete it before you finish."
    )
}
