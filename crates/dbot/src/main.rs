//! DBot - Main entry point.

use anyhow::Context;
use conversation_store::ConversationStore;
use dbot::commands::build_registry;
use dbot::config::{usable_token, Config};
use dbot::error::AppResult;
use dbot::platforms::{discord, telegram};
use dbot_core::{MessageProcessor, ResponseRenderer};
use std::sync::Arc;
use std::time::Duration;
use telegram_client::TelegramClient;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How long in-flight messages may finish after shutdown is requested.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting DBot...");

    let registry = Arc::new(build_registry(&config)?);
    info!("Registered {} commands: {:?}", registry.len(), registry.list());

    let store = match &config.conversation.journal_path {
        Some(path) => ConversationStore::open(path, config.conversation.max_records)
            .await
            .with_context(|| format!("Failed to open conversation journal {}", path.display()))?,
        None => ConversationStore::new(config.conversation.max_records),
    };
    info!(
        "Conversation store ready ({} records, max_records={})",
        store.len().await,
        config.conversation.max_records
    );

    let renderer = ResponseRenderer::new(config.commands.http_timeout)?;
    let processor = MessageProcessor::new(registry, store, renderer)
        .with_command_timeout(config.commands.timeout);

    let cancel = CancellationToken::new();
    let mut platforms = JoinSet::new();

    if !config.telegram.enable {
        info!("[{}] disabled", telegram::PROVIDER);
    } else if let Some(token) = usable_token(config.telegram.token.as_ref()) {
        let client = TelegramClient::new(
            &config.telegram.api_url,
            token,
            config.commands.http_timeout,
        )?;
        let poll_timeout = config.telegram.poll_timeout;
        let processor = processor.clone();
        let cancel = cancel.clone();
        platforms.spawn(async move {
            if let Err(e) = telegram::run(client, poll_timeout, processor, cancel).await {
                error!("[{}] Receive loop stopped: {}", telegram::PROVIDER, e);
            }
        });
    } else {
        error!("[{}] Telegram token is not set", telegram::PROVIDER);
    }

    if !config.discord.enable {
        info!("[{}] disabled", discord::PROVIDER);
    } else if let Some(token) = usable_token(config.discord.token.as_ref()) {
        let token = token.to_string();
        let processor = processor.clone();
        let cancel = cancel.clone();
        platforms.spawn(async move {
            if let Err(e) = discord::run(&token, processor, cancel).await {
                error!("[{}] Gateway client stopped: {}", discord::PROVIDER, e);
            }
        });
    } else {
        error!("[{}] Discord token is not set", discord::PROVIDER);
    }

    if platforms.is_empty() {
        warn!("No chat platform enabled, nothing to do");
        return Ok(());
    }

    info!("Listening for messages...");

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            finished = platforms.join_next() => {
                if let Some(Err(e)) = finished {
                    error!("Platform task panicked: {}", e);
                }
                if platforms.is_empty() {
                    warn!("All platforms stopped");
                    break;
                }
            }
        }
    }

    info!("Shutting down...");
    cancel.cancel();

    let drain = async { while platforms.join_next().await.is_some() {} };
    if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
        warn!("Shutdown drain timed out after {:?}", DRAIN_TIMEOUT);
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
