use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::ExposeSecret;
use teloxide::prelude::*;

use routie_bot::cli::{Cli, Commands};
use routie_bot::core::config::{webhook, Config};
use routie_bot::core::init_logger;
use routie_bot::core::web_server::{start_web_server, WebState};
use routie_bot::storage;
use routie_bot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, SharedApi};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the requested subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, store, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load .env first so RUST_LOG from it applies
    let _ = dotenv();
    init_logger()?;

    let config = Arc::new(Config::from_env().context("Failed to read configuration")?);
    tracing::info!(
        environment = %config.environment,
        bind_addr = %config.bind_addr,
        sales_enabled = config.early_bird_price.is_some(),
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::SetWebhook {
            url,
            drop_pending_updates,
        } => set_webhook(&config, url, drop_pending_updates).await,
        Commands::DeleteWebhook { drop_pending_updates } => delete_webhook(&config, drop_pending_updates).await,
    }
}

/// Run the webhook server
async fn run_server(config: Arc<Config>) -> Result<()> {
    let bot = create_bot(&config)?;

    let bot_username = match &bot {
        Some(bot) => {
            if let Err(e) = setup_bot_commands(bot).await {
                tracing::warn!(error = %e, "Failed to set bot commands");
            }
            match bot.get_me().await {
                Ok(me) => me.user.username.clone(),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to fetch bot info, retrying on the first addressed command");
                    None
                }
            }
        }
        None => {
            tracing::warn!("BOT_TOKEN is not set, the webhook will reject updates");
            None
        }
    };

    let store = storage::connect(&config).await.context("Failed to connect to the store")?;
    let deps = HandlerDeps::new(Arc::clone(&config), store, bot_username);
    let api = bot.map(|bot| Arc::new(bot) as SharedApi);

    let state = WebState::new(api, schema(deps), Arc::clone(&config));
    start_web_server(config.bind_addr, state).await?;

    tracing::info!("Webhook server stopped");
    Ok(())
}

/// Register the webhook with Telegram
async fn set_webhook(config: &Config, url: Option<String>, drop_pending_updates: bool) -> Result<()> {
    let bot = create_bot(config)?.context("BOT_TOKEN is not set")?;
    let url = match url {
        Some(raw) => url::Url::parse(&raw).context("Invalid webhook URL")?,
        None => config
            .webhook_url
            .clone()
            .with_context(|| format!("Pass --url or set WEBHOOK_URL (path {})", webhook::PATH))?,
    };
    let secret = config
        .webhook_secret
        .as_ref()
        .context("TG_WEBHOOK_SECRET is not set, Telegram updates would be rejected")?;

    bot.set_webhook(url.clone())
        .secret_token(secret.expose_secret().to_string())
        .drop_pending_updates(drop_pending_updates)
        .await?;
    tracing::info!(url = %url, "Webhook registered");
    Ok(())
}

/// Remove the webhook registration
async fn delete_webhook(config: &Config, drop_pending_updates: bool) -> Result<()> {
    let bot = create_bot(config)?.context("BOT_TOKEN is not set")?;
    bot.delete_webhook().drop_pending_updates(drop_pending_updates).await?;
    tracing::info!("Webhook deleted");
    Ok(())
}
