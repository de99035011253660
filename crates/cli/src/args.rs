//! Command-line arguments.

use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, ValueEnum};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./internal/config/config.yaml";

/// Triage one GitHub issue with a language model and post the answer as a comment.
#[derive(Parser)]
#[command(name = "triage", version)]
pub struct Cli {
    /// Repository name
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub repo: String,

    /// Repository owner
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub owner: String,

    /// Issue number
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub issue: u64,

    /// Command to be executed by the model (a key under ai.commands)
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub command: String,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// GitHub token
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub github_token: String,

    /// Completion service API key
    #[arg(
        long,
        env = "OPENAI_API_KEY",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub api_key: String,

    /// Root of the source tree appended to the prompt
    #[arg(long, default_value = ".")]
    pub source_root: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Cli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli")
            .field("repo", &self.repo)
            .field("owner", &self.owner)
            .field("issue", &self.issue)
            .field("command", &self.command)
            .field("config", &self.config)
            .field("github_token", &REDACTED)
            .field("api_key", &REDACTED)
            .field("source_root", &self.source_root)
            .field("log_format", &self.log_format)
            .finish()
    }
}

const REDACTED: &str = "[REDACTED]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
