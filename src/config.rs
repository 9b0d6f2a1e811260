//! Settings for drover, loaded from `drover.yaml`.
//!
//! # File Format
//!
//! ```yaml
//! agent:
//!   name: "Claude Code"
//!   binary: "claude"
//!   extra_args: "--model sonnet"
//! timeout_seconds: 600
//! output_file: "agent_summary.md"
//! ```
//!
//! All fields are optional and defaulted. Unknown fields are preserved in a
//! flattened `extra` map for forward compatibility. The timeout is clamped to
//! [30, 7200] seconds with a warning on stderr; values outside that range are
//! almost always configuration mistakes.

use crate::error::{DroverError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Minimum allowed agent timeout in seconds.
pub const MIN_TIMEOUT_SECONDS: u64 = 30;

/// Maximum allowed agent timeout in seconds (2 hours).
pub const MAX_TIMEOUT_SECONDS: u64 = 7200;

/// Default agent timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

fn default_agent_name() -> String {
    "Claude Code".to_string()
}

fn default_agent_binary() -> String {
    "claude".to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_output_file() -> String {
    "agent_summary.md".to_string()
}

/// Settings for a drover session, representing the contents of `drover.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Agent identity and invocation settings.
    pub agent: AgentSettings,

    /// Timeout for the agent run in seconds (clamped to [30, 7200] at use).
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Default result artifact filename, relative to the working directory.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Identity and invocation settings for the driven agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Human-readable display name (used in prompts, warnings, and errors).
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Executable name looked up on PATH (or an absolute path).
    #[serde(default = "default_agent_binary")]
    pub binary: String,

    /// Extra arguments appended after the fixed headless flags.
    ///
    /// Parsed with shell-words; never passed through a shell.
    #[serde(default)]
    pub extra_args: String,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            binary: default_agent_binary(),
            extra_args: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agent: AgentSettings::default(),
            timeout_seconds: default_timeout_seconds(),
            output_file: default_output_file(),
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    ///
    /// Returns defaults if the file does not exist. Returns `Err` if the file
    /// exists but cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DroverError::UserError(format!(
                "failed to read settings '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings = serde_yaml::from_str(yaml)
            .map_err(|e| DroverError::UserError(format!("failed to parse drover.yaml: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings.
    ///
    /// Validation rules:
    /// - Agent binary must not be empty
    /// - Agent name must not be empty
    /// - Output file must not be empty
    /// - Timeout must be greater than 0 (out-of-range values are clamped later)
    pub fn validate(&self) -> Result<()> {
        if self.agent.binary.trim().is_empty() {
            return Err(DroverError::UserError(
                "drover.yaml validation failed: agent.binary must not be empty".to_string(),
            ));
        }

        if self.agent.name.trim().is_empty() {
            return Err(DroverError::UserError(
                "drover.yaml validation failed: agent.name must not be empty".to_string(),
            ));
        }

        if self.output_file.trim().is_empty() {
            return Err(DroverError::UserError(
                "drover.yaml validation failed: output_file must not be empty".to_string(),
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(DroverError::UserError(
                "drover.yaml validation failed: timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the effective timeout for a run.
    ///
    /// A CLI override takes precedence over the file value; either way the
    /// result is clamped to [30, 7200] seconds.
    pub fn effective_timeout(&self, override_seconds: Option<u64>) -> u64 {
        clamp_timeout(override_seconds.unwrap_or(self.timeout_seconds))
    }

    /// Parse `agent.extra_args` into an argument vector.
    pub fn extra_agent_args(&self) -> Result<Vec<String>> {
        if self.agent.extra_args.trim().is_empty() {
            return Ok(Vec::new());
        }

        shell_words::split(&self.agent.extra_args).map_err(|e| {
            DroverError::UserError(format!(
                "failed to parse agent.extra_args '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                self.agent.extra_args, e
            ))
        })
    }
}

/// Clamp a requested timeout to the allowed range, warning when adjusted.
pub fn clamp_timeout(requested: u64) -> u64 {
    if requested < MIN_TIMEOUT_SECONDS {
        eprintln!(
            "Warning: timeout_seconds ({}) is too low, using minimum of {} seconds",
            requested, MIN_TIMEOUT_SECONDS
        );
        MIN_TIMEOUT_SECONDS
    } else if requested > MAX_TIMEOUT_SECONDS {
        eprintln!(
            "Warning: timeout_seconds ({}) is very high, using maximum of {} seconds",
            requested, MAX_TIMEOUT_SECONDS
        );
        MAX_TIMEOUT_SECONDS
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let settings = Settings::from_yaml("").unwrap();
        assert_eq!(settings.agent.name, "Claude Code");
        assert_eq!(settings.agent.binary, "claude");
        assert_eq!(settings.timeout_seconds, 600);
        assert_eq!(settings.output_file, "agent_summary.md");
        assert!(settings.agent.extra_args.is_empty());
    }

    #[test]
    fn parse_full_settings() {
        let yaml = r#"
agent:
  name: "Crush"
  binary: "crush"
  extra_args: "--model large"
timeout_seconds: 900
output_file: "summary.txt"
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.agent.name, "Crush");
        assert_eq!(settings.agent.binary, "crush");
        assert_eq!(settings.timeout_seconds, 900);
        assert_eq!(settings.output_file, "summary.txt");
        assert_eq!(
            settings.extra_agent_args().unwrap(),
            vec!["--model", "large"]
        );
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let settings = Settings::load(temp_dir.path().join("drover.yaml")).unwrap();
        assert_eq!(settings.agent.binary, "claude");
    }

    #[test]
    fn load_unparseable_file_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("drover.yaml");
        std::fs::write(&path, "agent: [not: a, mapping").unwrap();

        let result = Settings::load(&path);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("failed to parse drover.yaml")
        );
    }

    #[test]
    fn empty_binary_fails_validation() {
        let yaml = r#"
agent:
  binary: ""
"#;
        let result = Settings::from_yaml(yaml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("agent.binary must not be empty")
        );
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let result = Settings::from_yaml("timeout_seconds: 0");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("timeout_seconds must be greater than 0")
        );
    }

    #[test]
    fn empty_output_file_fails_validation() {
        let result = Settings::from_yaml("output_file: \"\"");
        assert!(result.is_err());
    }

    #[test]
    fn timeout_clamped_low() {
        assert_eq!(clamp_timeout(5), MIN_TIMEOUT_SECONDS);
    }

    #[test]
    fn timeout_clamped_high() {
        assert_eq!(clamp_timeout(100_000), MAX_TIMEOUT_SECONDS);
    }

    #[test]
    fn timeout_in_range_unchanged() {
        assert_eq!(clamp_timeout(600), 600);
        assert_eq!(clamp_timeout(MIN_TIMEOUT_SECONDS), MIN_TIMEOUT_SECONDS);
        assert_eq!(clamp_timeout(MAX_TIMEOUT_SECONDS), MAX_TIMEOUT_SECONDS);
    }

    #[test]
    fn effective_timeout_prefers_override() {
        let settings = Settings::default();
        assert_eq!(settings.effective_timeout(Some(900)), 900);
        assert_eq!(settings.effective_timeout(None), 600);
        // Overrides are clamped too
        assert_eq!(settings.effective_timeout(Some(1)), MIN_TIMEOUT_SECONDS);
    }

    #[test]
    fn extra_args_empty_by_default() {
        let settings = Settings::default();
        assert!(settings.extra_agent_args().unwrap().is_empty());
    }

    #[test]
    fn extra_args_respect_quoting() {
        let yaml = r#"
agent:
  extra_args: "--append-system-prompt 'be terse'"
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(
            settings.extra_agent_args().unwrap(),
            vec!["--append-system-prompt", "be terse"]
        );
    }

    #[test]
    fn extra_args_unmatched_quote_fails() {
        let yaml = r#"
agent:
  extra_args: "--flag \"unmatched"
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        let result = settings.extra_agent_args();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("failed to parse"));
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let yaml = r#"
agent:
  binary: "claude"
  future_setting: true
timeout_seconds: 600
future_top_level: "also preserved"
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert!(settings.agent.extra.contains_key("future_setting"));
        assert!(settings.extra.contains_key("future_top_level"));

        // Round-trip should preserve unknown fields
        let yaml_out = serde_yaml::to_string(&settings).unwrap();
        let settings2 = Settings::from_yaml(&yaml_out).unwrap();
        assert!(settings2.extra.contains_key("future_top_level"));
    }
}
