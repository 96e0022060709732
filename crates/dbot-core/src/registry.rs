//! Registry of available commands.

use crate::command::Command;
use std::sync::Arc;
use tracing::warn;

/// Fixed set of commands, built at startup.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. A keyword already claimed by an earlier command
    /// keeps resolving to that command.
    pub fn register(&mut self, command: Arc<dyn Command>) {
        for keyword in command.accepted_commands() {
            if let Some(existing) = self.resolve(keyword) {
                warn!(
                    "Keyword '{}' of {} already handled by {}",
                    keyword,
                    command.name(),
                    existing.name()
                );
            }
        }
        self.commands.push(command);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, command: Arc<dyn Command>) -> Self {
        self.register(command);
        self
    }

    /// Find the command accepting `keyword`.
    pub fn resolve(&self, keyword: &str) -> Option<Arc<dyn Command>> {
        self.commands.iter().find(|c| c.accepts(keyword)).cloned()
    }

    /// Check if `keyword` names a registered command.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.commands.iter().any(|c| c.accepts(keyword))
    }

    /// List registered command names.
    pub fn list(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
