//! Chat platform adapters.

pub mod discord;
pub mod telegram;

pub use discord::DiscordPlatform;
pub use telegram::TelegramPlatform;
