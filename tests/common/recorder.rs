//! `ChatApi` fake that records every Bot API call

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use routie_bot::core::error::{AppError, AppResult};
use routie_bot::telegram::api::{ChatApi, Invoice};
use teloxide::types::{CallbackQueryId, ChatId, InlineKeyboardMarkup, MessageId, ParseMode, PreCheckoutQueryId};

/// Message ids handed out by the fake start here
pub const FIRST_MESSAGE_ID: i32 = 100;
/// Username reported by the fake's `getMe`
pub const BOT_USERNAME: &str = "routie_bot";

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    SendText {
        chat_id: i64,
        text: String,
        parse_mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    SendAnimation {
        chat_id: i64,
        file_id: String,
        caption: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    SendInvoice {
        chat_id: i64,
        invoice: Invoice,
    },
    EditText {
        chat_id: i64,
        message_id: i32,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    EditKeyboard {
        chat_id: i64,
        message_id: i32,
        keyboard: InlineKeyboardMarkup,
    },
    DeleteMessage {
        chat_id: i64,
        message_id: i32,
    },
    AnswerCallback {
        query_id: String,
        text: Option<String>,
    },
    AnswerPreCheckout {
        query_id: String,
        error: Option<String>,
    },
    RefundStars {
        user_id: i64,
        charge_id: String,
    },
    GetMe,
}

#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<ApiCall>>,
    next_message_id: AtomicI32,
    fail_deletes: AtomicBool,
    fail_get_me: AtomicBool,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(FIRST_MESSAGE_ID),
            fail_deletes: AtomicBool::new(false),
            fail_get_me: AtomicBool::new(false),
        }
    }

    /// Makes `getMe` fail (or succeed again), like a Telegram outage at startup.
    pub fn fail_get_me(&self, fail: bool) {
        self.fail_get_me.store(fail, Ordering::SeqCst);
    }

    /// Makes `delete_message` fail, like Telegram does for messages that are already gone.
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Toast texts of all callback answers, `None` for silent acks
    pub fn callback_answers(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::AnswerCallback { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn pre_checkout_answers(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::AnswerPreCheckout { error, .. } => Some(error),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_id(&self) -> MessageId {
        MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl ChatApi for RecordingApi {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<MessageId> {
        self.record(ApiCall::SendText {
            chat_id: chat_id.0,
            text: text.to_string(),
            parse_mode,
            keyboard,
        });
        Ok(self.next_id())
    }

    async fn send_animation(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<MessageId> {
        self.record(ApiCall::SendAnimation {
            chat_id: chat_id.0,
            file_id: file_id.to_string(),
            caption: caption.to_string(),
            keyboard,
        });
        Ok(self.next_id())
    }

    async fn send_invoice(&self, chat_id: ChatId, invoice: &Invoice) -> AppResult<MessageId> {
        self.record(ApiCall::SendInvoice {
            chat_id: chat_id.0,
            invoice: invoice.clone(),
        });
        Ok(self.next_id())
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        _parse_mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<()> {
        self.record(ApiCall::EditText {
            chat_id: chat_id.0,
            message_id: message_id.0,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn edit_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        keyboard: InlineKeyboardMarkup,
    ) -> AppResult<()> {
        self.record(ApiCall::EditKeyboard {
            chat_id: chat_id.0,
            message_id: message_id.0,
            keyboard,
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()> {
        self.record(ApiCall::DeleteMessage {
            chat_id: chat_id.0,
            message_id: message_id.0,
        });
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Payload("message to delete not found".to_string()));
        }
        Ok(())
    }

    async fn answer_callback(&self, query_id: &CallbackQueryId, text: Option<&str>) -> AppResult<()> {
        self.record(ApiCall::AnswerCallback {
            query_id: query_id.0.clone(),
            text: text.map(str::to_string),
        });
        Ok(())
    }

    async fn answer_pre_checkout(&self, query_id: &PreCheckoutQueryId, error: Option<&str>) -> AppResult<()> {
        self.record(ApiCall::AnswerPreCheckout {
            query_id: query_id.0.clone(),
            error: error.map(str::to_string),
        });
        Ok(())
    }

    async fn refund_stars(&self, user_id: i64, charge_id: &str) -> AppResult<()> {
        self.record(ApiCall::RefundStars {
            user_id,
            charge_id: charge_id.to_string(),
        });
        Ok(())
    }

    async fn bot_username(&self) -> AppResult<Option<String>> {
        self.record(ApiCall::GetMe);
        if self.fail_get_me.load(Ordering::SeqCst) {
            return Err(AppError::Payload("getMe timed out".to_string()));
        }
        Ok(Some(BOT_USERNAME.to_string()))
    }
}
