//! Implementation of the `drover check` command.
//!
//! Runs the read-only readiness probes and prints a report. Nothing is
//! mutated and no long-running subprocess is spawned; exit code 1 signals
//! that at least one probe failed.

use crate::agent::{HeadlessAgent, Readiness};
use crate::cli::CheckArgs;
use crate::config::Settings;
use crate::context::SessionContext;
use crate::error::{DroverError, Result};

/// Execute the `drover check` command.
pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let ctx = SessionContext::resolve()?;
    let settings = Settings::load(ctx.settings_path())?;
    let timeout = settings.effective_timeout(None);
    let agent = HeadlessAgent::new(&ctx, &settings, timeout);

    let mut checks: Vec<(&str, Readiness)> = vec![("agent binary", agent.availability())];

    if let Some(ref project) = args.project {
        checks.push((
            "project directory",
            agent.project_directory_check(project),
        ));
    }

    println!("Readiness checks for '{}':", ctx.project_name);
    println!();

    let mut failed = 0;
    for (name, readiness) in &checks {
        let marker = if readiness.ready { "OK   " } else { "FAIL " };
        println!("  {}{}: {}", marker, name, readiness.message);
        if !readiness.ready {
            failed += 1;
        }
    }

    if !settings_file_exists(&ctx) {
        println!();
        println!(
            "  Note: no {} found; using default settings.",
            crate::context::SETTINGS_FILE
        );
    }

    println!();
    if failed > 0 {
        return Err(DroverError::UserError(format!(
            "{} readiness check(s) failed.",
            failed
        )));
    }

    println!("Ready. Run `drover run <instruction>` to dispatch the agent.");
    Ok(())
}

fn settings_file_exists(ctx: &SessionContext) -> bool {
    ctx.settings_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn settings_file_detection() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = SessionContext::resolve_from(temp_dir.path()).unwrap();
        assert!(!settings_file_exists(&ctx));

        std::fs::write(ctx.settings_path(), "timeout_seconds: 600\n").unwrap();
        assert!(settings_file_exists(&ctx));
    }
}
