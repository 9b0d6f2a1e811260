//! Session context resolution for drover.
//!
//! A `SessionContext` is the explicit working-directory state object: the
//! target repository root, the project name derived from it, and the paths
//! drover reads and writes under that root. Every command resolves one
//! context up front and passes it by reference; no operation consults the
//! current working directory or other implicit state after resolution.

use crate::error::{DroverError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Settings file name at the working-directory root.
pub const SETTINGS_FILE: &str = "drover.yaml";

/// State directory name at the working-directory root.
pub const STATE_DIR: &str = ".drover";

/// Run-event log file name within the state directory.
pub const EVENTS_FILE: &str = "events.ndjson";

/// Resolved paths and identity for one drover session.
///
/// All paths are absolute.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Absolute path to the working directory (the target repository root).
    pub root: PathBuf,

    /// Project name: the base name of the working directory.
    pub project_name: String,
}

impl SessionContext {
    /// Resolve the session context from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            DroverError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the session context from a specific directory.
    ///
    /// This is useful for testing or when the working directory is known.
    pub fn resolve_from<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let root = dir.canonicalize().map_err(|e| {
            DroverError::UserError(format!(
                "working directory '{}' is not accessible: {}",
                dir.display(),
                e
            ))
        })?;

        if !root.is_dir() {
            return Err(DroverError::UserError(format!(
                "'{}' is not a directory",
                root.display()
            )));
        }

        let project_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self { root, project_name })
    }

    /// Get the path to the settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Get the path to the state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Get the path to the run-event log file.
    pub fn events_path(&self) -> PathBuf {
        self.state_dir().join(EVENTS_FILE)
    }

    /// Resolve a result artifact path relative to the working directory.
    ///
    /// The agent writes the artifact in its own working directory, so an
    /// absolute path is taken as-is and a relative one is joined to the root.
    pub fn artifact_path(&self, output_file: &str) -> PathBuf {
        let path = Path::new(output_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = SessionContext::resolve_from(temp_dir.path()).unwrap();

        let expected_root = temp_dir.path().canonicalize().unwrap();
        assert_eq!(ctx.root, expected_root);
        assert_eq!(
            ctx.project_name,
            expected_root.file_name().unwrap().to_string_lossy()
        );
    }

    #[test]
    #[serial_test::serial]
    fn resolve_uses_current_directory() {
        let temp_dir = TempDir::new().unwrap();
        let original = std::env::current_dir().unwrap();

        std::env::set_current_dir(temp_dir.path()).unwrap();
        let result = SessionContext::resolve();
        std::env::set_current_dir(original).unwrap();

        let ctx = result.unwrap();
        assert_eq!(ctx.root, temp_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn resolve_from_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let result = SessionContext::resolve_from(&missing);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not accessible"));
    }

    #[test]
    fn settings_and_state_paths() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = SessionContext::resolve_from(temp_dir.path()).unwrap();

        assert!(ctx.settings_path().ends_with("drover.yaml"));
        assert!(ctx.state_dir().ends_with(".drover"));
        assert!(ctx.events_path().ends_with("events.ndjson"));
        assert!(ctx.events_path().starts_with(ctx.state_dir()));
    }

    #[test]
    fn artifact_path_relative_joins_root() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = SessionContext::resolve_from(temp_dir.path()).unwrap();

        let artifact = ctx.artifact_path("agent_summary.md");
        assert_eq!(artifact, ctx.root.join("agent_summary.md"));
    }

    #[test]
    fn artifact_path_absolute_taken_as_is() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = SessionContext::resolve_from(temp_dir.path()).unwrap();

        let absolute = temp_dir.path().join("elsewhere").join("summary.md");
        let artifact = ctx.artifact_path(&absolute.to_string_lossy());
        assert_eq!(artifact, absolute);
    }

    #[test]
    fn project_name_is_base_name() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("my-project");
        std::fs::create_dir_all(&project).unwrap();

        let ctx = SessionContext::resolve_from(&project).unwrap();
        assert_eq!(ctx.project_name, "my-project");
    }
}
