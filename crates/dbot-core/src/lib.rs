//! Command parsing, conversation threading and dispatch for DBot.
//!
//! An inbound chat message flows through [`Request::parse`], the
//! [`ThreadResolver`], the [`Dispatcher`] and the [`ResponseRenderer`];
//! [`MessageProcessor`] wires the steps together for platform adapters.

mod command;
mod dispatcher;
mod error;
mod platform;
mod processor;
mod registry;
mod render;
mod request;
mod resolver;
mod response;

pub use command::Command;
pub use dispatcher::{Dispatcher, ERROR_MESSAGE, TIMEOUT_MESSAGE};
pub use error::{CommandError, CoreError, MediaError, ParseError, PlatformError};
pub use platform::{ChatPlatform, InboundMessage, MediaUpload, RepliedMessage};
pub use processor::{MessageProcessor, Outcome};
pub use registry::CommandRegistry;
pub use render::{
    extension_for, split_message, split_with_prefix_room, ResponseRenderer, SentMessage,
    CHUNK_PREFIX_HEADROOM, MEDIA_DELIVERY_FAILURE_MESSAGE,
};
pub use request::{Request, RequestMessage, Sender};
pub use resolver::{ResolvedTurn, ThreadKind, ThreadResolver};
pub use response::{MediaResponse, Response, TextResponse};
