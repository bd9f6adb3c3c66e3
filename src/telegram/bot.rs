//! Bot instance creation and the command set

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, Config};
use crate::core::error::{AppError, AppResult};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "camelCase", description = "Routie bot commands:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "bot statistics (admins only)")]
    GetStats,
}

/// Creates the Bot API client, or `None` when no token is configured.
///
/// # Returns
/// * `Ok(Some(Bot))` - Client with the configured timeout and API URL
/// * `Ok(None)` - `BOT_TOKEN` is not set
/// * `Err(AppError)` - The HTTP client could not be built
pub fn create_bot(config: &Config) -> AppResult<Option<Bot>> {
    let Some(token) = config.bot_token.as_ref() else {
        return Ok(None);
    };

    let client = ClientBuilder::new()
        .timeout(config::network::timeout())
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
    let mut bot = Bot::with_client(token.expose_secret(), client);

    if let Some(url) = config.bot_api_url.clone() {
        tracing::info!(url = %url, "Using custom Bot API URL");
        bot = bot.set_api_url(url);
    }

    Ok(Some(bot))
}

/// Sets up bot commands in Telegram UI. Only `/start` is public.
pub async fn setup_bot_commands(bot: &Bot) -> AppResult<()> {
    bot.set_my_commands(vec![BotCommand::new("start", "show the welcome message")])
        .await?;
    Ok(())
}

/// Parses a command addressed to this bot (or to no bot in particular).
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    Command::parse(text, bot_username.unwrap_or_default()).ok()
}
