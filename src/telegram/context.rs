//! What every flow needs: the Bot API, the store and the configuration

use teloxide::types::{CallbackQueryId, ChatId, MessageId};

use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::storage::Store;
use crate::telegram::api::ChatApi;

#[derive(Clone, Copy)]
pub struct FlowContext<'a> {
    pub api: &'a dyn ChatApi,
    /// `None` when no store is configured
    pub store: Option<&'a dyn Store>,
    pub config: &'a Config,
}

impl<'a> FlowContext<'a> {
    pub fn new(api: &'a dyn ChatApi, store: Option<&'a dyn Store>, config: &'a Config) -> Self {
        Self { api, store, config }
    }

    pub fn store(&self) -> AppResult<&'a dyn Store> {
        self.store.ok_or(AppError::StoreUnavailable)
    }
}

/// An inline button press, reduced to what the flows use.
#[derive(Debug, Clone)]
pub struct ButtonPress {
    pub query_id: CallbackQueryId,
    pub user_id: i64,
    /// Chat and id of the message carrying the button, when still accessible
    pub message: Option<(ChatId, MessageId)>,
}

impl ButtonPress {
    /// Chat to reply in; buttons only live in private chats, so the user id is the fallback.
    pub fn chat_id(&self) -> ChatId {
        self.message.map(|(chat_id, _)| chat_id).unwrap_or(ChatId(self.user_id))
    }
}
