//! Handler types and dependencies

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::core::config::Config;
use crate::storage::Store;
use crate::telegram::api::ChatApi;
use crate::telegram::bot::{parse_command, Command};
use crate::telegram::context::FlowContext;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Bot API handle injected into every dispatch
pub type SharedApi = Arc<dyn ChatApi>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub config: Arc<Config>,
    /// `None` when `REDIS_URL` is not configured
    pub store: Option<Arc<dyn Store>>,
    /// Used to accept `/command@username`; fetched on demand when unknown at startup
    bot_username: Arc<OnceCell<String>>,
}

impl HandlerDeps {
    pub fn new(config: Arc<Config>, store: Option<Arc<dyn Store>>, bot_username: Option<String>) -> Self {
        Self {
            config,
            store,
            bot_username: Arc::new(OnceCell::new_with(bot_username)),
        }
    }

    /// Parses a command in `text`.
    ///
    /// A `/command@username` that arrives before the username is known asks
    /// Telegram for it; a failed lookup is retried on the next such command.
    pub async fn command(&self, api: &dyn ChatApi, text: &str) -> Option<Command> {
        let addressed = text
            .split_whitespace()
            .next()
            .is_some_and(|word| word.starts_with('/') && word.contains('@'));
        let username = match self.bot_username.get() {
            Some(name) => Some(name.clone()),
            None if addressed => self.fetch_bot_username(api).await,
            None => None,
        };
        parse_command(text, username.as_deref())
    }

    async fn fetch_bot_username(&self, api: &dyn ChatApi) -> Option<String> {
        match api.bot_username().await {
            Ok(Some(name)) => Some(self.bot_username.get_or_init(move || async move { name }).await.clone()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch the bot username");
                None
            }
        }
    }

    pub fn flow<'a>(&'a self, api: &'a dyn ChatApi) -> FlowContext<'a> {
        FlowContext::new(api, self.store.as_deref(), &self.config)
    }
}
