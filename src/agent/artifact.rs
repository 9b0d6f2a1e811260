//! Result artifact access.
//!
//! The agent is instructed to persist a summary of its work to a designated
//! file in the working directory. Reading that file back is a narrow
//! collaborator of the reconciler: full text on success, a typed error when
//! the artifact is missing or unreadable.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The result artifact could not be read.
#[derive(Debug, Error)]
#[error("result artifact '{path}' could not be read: {source}")]
pub struct ArtifactUnavailable {
    /// The path that was expected to exist.
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Read the full text of the result artifact.
pub fn read_artifact(path: &Path) -> std::result::Result<String, ArtifactUnavailable> {
    std::fs::read_to_string(path).map_err(|source| ArtifactUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_existing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent_summary.md");
        std::fs::write(&path, "did the thing").unwrap();

        assert_eq!(read_artifact(&path).unwrap(), "did the thing");
    }

    #[test]
    fn missing_artifact_error_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent_summary.md");

        let err = read_artifact(&path).unwrap_err();
        assert!(err.to_string().contains("agent_summary.md"));
        assert!(err.to_string().contains("could not be read"));
    }
}
