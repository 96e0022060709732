//! DBot - a Telegram and Discord chat bot.

pub mod commands;
pub mod config;
pub mod error;
pub mod platforms;
