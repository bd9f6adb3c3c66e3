//! Bot API surface used by the flows
//!
//! Flows never hold a `Bot` directly; they talk to [`ChatApi`], which
//! `teloxide::Bot` implements here and the integration tests implement with a
//! recording fake.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, FileId, InlineKeyboardMarkup, InputFile, LabeledPrice, MessageId, ParseMode, PreCheckoutQueryId,
    TelegramTransactionId, UserId,
};

use crate::core::config::early_access;
use crate::core::error::{AppError, AppResult};

/// A Telegram Stars invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub title: String,
    pub description: String,
    pub payload: String,
    pub label: String,
    pub amount: u32,
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<MessageId>;

    async fn send_animation(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<MessageId>;

    async fn send_invoice(&self, chat_id: ChatId, invoice: &Invoice) -> AppResult<MessageId>;

    /// Replaces text and keyboard; `None` removes the keyboard.
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<()>;

    async fn edit_keyboard(&self, chat_id: ChatId, message_id: MessageId, keyboard: InlineKeyboardMarkup)
        -> AppResult<()>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()>;

    /// Acknowledges a button press, optionally with a toast.
    async fn answer_callback(&self, query_id: &CallbackQueryId, text: Option<&str>) -> AppResult<()>;

    /// Approves the checkout when `error` is `None`, otherwise rejects it with that message.
    async fn answer_pre_checkout(&self, query_id: &PreCheckoutQueryId, error: Option<&str>) -> AppResult<()>;

    /// Returns a Stars payment to the user who made it.
    async fn refund_stars(&self, user_id: i64, charge_id: &str) -> AppResult<()>;

    /// The bot's own `@username`, if it has one.
    async fn bot_username(&self) -> AppResult<Option<String>>;
}

#[async_trait]
impl ChatApi for Bot {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<MessageId> {
        let mut request = self.send_message(chat_id, text);
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        Ok(request.await?.id)
    }

    async fn send_animation(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<MessageId> {
        let mut request = Requester::send_animation(self, chat_id, InputFile::file_id(FileId(file_id.to_string())))
            .caption(caption);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        Ok(request.await?.id)
    }

    async fn send_invoice(&self, chat_id: ChatId, invoice: &Invoice) -> AppResult<MessageId> {
        let message = Requester::send_invoice(
            self,
            chat_id,
            invoice.title.clone(),
            invoice.description.clone(),
            invoice.payload.clone(),
            early_access::CURRENCY.to_string(),
            vec![LabeledPrice::new(invoice.label.clone(), invoice.amount)],
        )
        .await?;
        Ok(message.id)
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<()> {
        let mut request = self.edit_message_text(chat_id, message_id, text);
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn edit_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        keyboard: InlineKeyboardMarkup,
    ) -> AppResult<()> {
        self.edit_message_reply_markup(chat_id, message_id)
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()> {
        Requester::delete_message(self, chat_id, message_id).await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &CallbackQueryId, text: Option<&str>) -> AppResult<()> {
        let mut request = self.answer_callback_query(query_id.clone());
        if let Some(text) = text {
            request = request.text(text);
        }
        request.await?;
        Ok(())
    }

    async fn answer_pre_checkout(&self, query_id: &PreCheckoutQueryId, error: Option<&str>) -> AppResult<()> {
        match error {
            None => {
                self.answer_pre_checkout_query(query_id.clone(), true).await?;
            }
            Some(message) => {
                self.answer_pre_checkout_query(query_id.clone(), false)
                    .error_message(message)
                    .await?;
            }
        }
        Ok(())
    }

    async fn refund_stars(&self, user_id: i64, charge_id: &str) -> AppResult<()> {
        let user_id = u64::try_from(user_id).map_err(|_| AppError::Payload(format!("invalid user id {}", user_id)))?;
        self.refund_star_payment(UserId(user_id), TelegramTransactionId(charge_id.to_string()))
            .await?;
        Ok(())
    }

    async fn bot_username(&self) -> AppResult<Option<String>> {
        let me = self.get_me().await?;
        Ok(me.user.username.clone())
    }
}
