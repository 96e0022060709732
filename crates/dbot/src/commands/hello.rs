//! Hello command - echoes the raw message back.

use async_trait::async_trait;
use dbot_core::{Command, CommandError, Request, Response};

pub struct HelloCommand;

#[async_trait]
impl Command for HelloCommand {
    fn name(&self) -> &str {
        "hello"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["/HELLO"]
    }

    async fn execute(&self, request: &Request) -> Result<Response, CommandError> {
        Ok(Response::text(format!("Hello world. You said {}", request.message)))
    }
}
