//! Command resolution.
//!
//! A [`CommandCatalog`] is built once from the `ai` section of the
//! configuration and maps each command name to its system prompt and model.

use std::collections::BTreeMap;

use crate::config::AiConfig;
use crate::{CommandName, ModelName, TriageError};

/// A command with its model already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub name: CommandName,
    pub system_prompt: String,
    pub model: ModelName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CommandEntry {
    description: String,
    system_prompt: String,
    model: ModelName,
}

/// Read-only mapping of command names to prompts and models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCatalog {
    commands: BTreeMap<CommandName, CommandEntry>,
}

impl CommandCatalog {
    /// Builds the catalog, applying `ai.model` to commands without their own.
    pub fn from_config(ai: &AiConfig) -> Result<Self, TriageError> {
        let default_model = ModelName::new(ai.model.trim())
            .ok_or_else(|| TriageError::configuration("ai.model must not be empty"))?;
        if ai.commands.is_empty() {
            return Err(TriageError::configuration(
                "ai.commands must define at least one command",
            ));
        }

        let mut commands = BTreeMap::new();
        for (name, command) in &ai.commands {
            let key = CommandName::new(name.as_str()).ok_or_else(|| {
                TriageError::configuration("ai.commands contains an empty command name")
            })?;
            let model = match &command.model {
                Some(model) => ModelName::new(model.trim()).ok_or_else(|| {
                    TriageError::configuration(format!(
                        "ai.commands.{name}.model must not be empty when set"
                    ))
                })?,
                None => default_model.clone(),
            };
            commands.insert(
                key,
                CommandEntry {
                    description: command.description.clone(),
                    system_prompt: command.system_prompt.clone(),
                    model,
                },
            );
        }

        Ok(Self { commands })
    }

    /// Looks up `name`, failing with [`TriageError::UnknownCommand`] when absent.
    pub fn resolve(&self, name: &CommandName) -> Result<ResolvedCommand, TriageError> {
        let entry = self
            .commands
            .get(name)
            .ok_or_else(|| TriageError::UnknownCommand {
                command: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })?;

        Ok(ResolvedCommand {
            name: name.clone(),
            system_prompt: entry.system_prompt.clone(),
            model: entry.model.clone(),
        })
    }

    /// Configured command names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(CommandName::as_str)
    }

    /// Description of `name`, if the command exists.
    pub fn description(&self, name: &CommandName) -> Option<&str> {
        self.commands
            .get(name)
            .map(|entry| entry.description.as_str())
    }
}
