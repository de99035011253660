//! Configuration model.
//!
//! The YAML document is parsed into these types once at startup and never
//! mutated afterwards. Reading the file from disk is the caller's job; this
//! module only deals with text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CommandCatalog, TriageError};

/// Default GitHub REST API root.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default OpenAI-compatible API root.
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";

/// Log level value that turns on verbose diagnostics.
const DEBUG_LOG_LEVEL: &str = "debug";

/// Root of the configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub github: GithubConfig,
    pub ai: AiConfig,
}

/// `system.*`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// `system.debug.*`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    #[serde(default)]
    pub log_level: String,
}

/// `github.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
        }
    }
}

/// `ai.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Model used by every command that does not name its own.
    pub model: String,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub commands: BTreeMap<String, CommandConfig>,
}

/// `ai.commands.<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// One-line summary shown when listing commands.
    #[serde(default)]
    pub description: String,
    pub system_prompt: String,
    /// Overrides `ai.model` for this command.
    #[serde(default)]
    pub model: Option<String>,
}

/// What to do when a tracker read, repository read, or completion fails.
///
/// Posting the comment and loading configuration are outside this policy:
/// they are always fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run at the first failure.
    #[default]
    Abort,
    /// Substitute an empty value, log a warning, and keep going.
    Degrade,
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_ai_base_url() -> String {
    DEFAULT_AI_BASE_URL.to_string()
}

impl TriageConfig {
    /// Parses and validates a YAML configuration document.
    pub fn from_yaml_str(text: &str) -> Result<Self, TriageError> {
        let config: TriageConfig = serde_yaml::from_str(text)
            .map_err(|e| TriageError::configuration(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns `true` when `system.debug.log_level` is exactly `debug`.
    pub fn debug_enabled(&self) -> bool {
        self.system.debug.log_level == DEBUG_LOG_LEVEL
    }

    fn validate(&self) -> Result<(), TriageError> {
        CommandCatalog::from_config(&self.ai).map(drop)
    }
}
