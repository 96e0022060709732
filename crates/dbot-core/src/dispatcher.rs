//! Command dispatcher with timeout and error handling.

use crate::registry::CommandRegistry;
use crate::request::Request;
use crate::response::Response;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

pub const TIMEOUT_MESSAGE: &str = "Sorry, that took too long. Please try again later.";
pub const ERROR_MESSAGE: &str = "Sorry, something went wrong.";

/// Runs the command a request resolves to.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(90),
        }
    }

    /// Set the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Execute the command for `request.command`.
    ///
    /// Returns `None` when no command matches. Handler errors and timeouts
    /// become failure text.
    pub async fn dispatch(&self, request: &Request) -> Option<Response> {
        let command = self.registry.resolve(&request.command)?;
        info!(command = %command.name(), keyword = %request.command, "Dispatching");

        let response = match timeout(self.timeout, command.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(command = %command.name(), error = %e, "Command failed");
                Response::failure(ERROR_MESSAGE)
            }
            Err(_) => {
                error!(command = %command.name(), timeout = ?self.timeout, "Command timed out");
                Response::failure(TIMEOUT_MESSAGE)
            }
        };

        if command.supports_conversation() {
            Some(response.into_conversational())
        } else {
            Some(response)
        }
    }
}
