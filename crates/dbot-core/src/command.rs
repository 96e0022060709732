//! The command handler trait.

use crate::error::CommandError;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;

/// A chat command.
///
/// Implementations hold no per-call state; the same instance serves
/// concurrent invocations.
#[async_trait]
pub trait Command: Send + Sync {
    /// Handler name for logs.
    fn name(&self) -> &str;

    /// Keywords this command answers to, matched case-insensitively.
    fn accepted_commands(&self) -> &[&'static str];

    /// Whether successful text replies continue a conversation thread.
    fn supports_conversation(&self) -> bool {
        false
    }

    /// Check if this command answers to `keyword`.
    fn accepts(&self, keyword: &str) -> bool {
        self.accepted_commands()
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(keyword))
    }

    /// Execute the command.
    async fn execute(&self, request: &Request) -> Result<Response, CommandError>;
}
