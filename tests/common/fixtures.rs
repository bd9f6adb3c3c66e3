//! Test environment and Telegram fixtures
//!
//! `TestEnvironment` wires a [`RecordingApi`] and a [`MemoryStore`] into the
//! same [`FlowContext`] / [`HandlerDeps`] the webhook uses.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use routie_bot::core::config::Config;
use routie_bot::storage::{MemoryStore, Store, UserRecord};
use routie_bot::telegram::payment::Payment;
use routie_bot::telegram::{ButtonPress, FlowContext, HandlerDeps, SharedApi};
use serde_json::{Value, json};
use teloxide::types::{CallbackQueryId, ChatId, MessageId, User};

use super::recorder::{BOT_USERNAME, RecordingApi};

pub const ADMIN_ID: i64 = 1313487041;
pub const USER_ID: i64 = 4242;
pub const PRICE: u32 = 150;
pub const WEBHOOK_SECRET: &str = "test-secret";
/// Id of the welcome message that carries the buttons in callback fixtures
pub const WELCOME_MESSAGE_ID: i32 = 7;

pub struct TestEnvironment {
    pub api: Arc<RecordingApi>,
    pub store: Arc<MemoryStore>,
    pub config: Arc<Config>,
}

impl TestEnvironment {
    /// Sales enabled, text welcome, default admins and cap.
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Default environment with `overrides` applied on top.
    pub fn with_env(overrides: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = [
            ("BOT_TOKEN", "123:test"),
            ("TG_WEBHOOK_SECRET", WEBHOOK_SECRET),
            ("REDIS_URL", "memory://"),
            ("EARLY_BIRD_ACCESS_PRICE", "150"),
            ("WELCOME_ANIMATION", ""),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (key, value) in overrides {
            env.insert(key.to_string(), value.to_string());
        }

        let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
        Self {
            api: Arc::new(RecordingApi::new()),
            store: Arc::new(MemoryStore::new()),
            config: Arc::new(config),
        }
    }

    pub fn ctx(&self) -> FlowContext<'_> {
        FlowContext::new(self.api.as_ref(), Some(self.store.as_ref() as &dyn Store), &self.config)
    }

    pub fn ctx_without_store(&self) -> FlowContext<'_> {
        FlowContext::new(self.api.as_ref(), None, &self.config)
    }

    pub fn deps(&self) -> HandlerDeps {
        let store: Arc<dyn Store> = self.store.clone();
        HandlerDeps::new(Arc::clone(&self.config), Some(store), Some(BOT_USERNAME.to_string()))
    }

    /// Dependencies of a server that could not read its username at startup.
    pub fn deps_without_username(&self) -> HandlerDeps {
        let store: Arc<dyn Store> = self.store.clone();
        HandlerDeps::new(Arc::clone(&self.config), Some(store), None)
    }

    pub fn shared_api(&self) -> SharedApi {
        self.api.clone()
    }

    pub async fn seed_user(&self, id: i64) {
        self.store.seed_user(UserRecord::new(id)).await;
    }

    pub async fn seed_user_with_access(&self, id: i64) {
        let mut user = UserRecord::new(id);
        user.is_have_access = true;
        user.is_early_bird = true;
        self.store.seed_user(user).await;
    }

    pub async fn user(&self, id: i64) -> UserRecord {
        self.store.get_user(id).await.unwrap().unwrap()
    }
}

pub fn user_json(id: i64) -> Value {
    json!({
        "id": id,
        "is_bot": false,
        "first_name": "Test",
        "last_name": "User",
        "username": "tester",
        "language_code": "en"
    })
}

pub fn telegram_user(id: i64) -> User {
    serde_json::from_value(user_json(id)).unwrap()
}

/// A press on a button of the welcome message.
pub fn press(user_id: i64) -> ButtonPress {
    ButtonPress {
        query_id: CallbackQueryId(format!("cb-{}", user_id)),
        user_id,
        message: Some((ChatId(user_id), MessageId(WELCOME_MESSAGE_ID))),
    }
}

/// A press on a button of another message.
pub fn press_on(user_id: i64, message_id: i32) -> ButtonPress {
    ButtonPress {
        message: Some((ChatId(user_id), MessageId(message_id))),
        ..press(user_id)
    }
}

pub fn early_bird_payload(user_id: i64) -> String {
    format!(r#"{{"userId":{},"action":"buyEarlyBirdAccess"}}"#, user_id)
}

/// A `successful_payment` made by `user_id` with `payload`.
pub fn paid(user_id: i64, payload: &str) -> Payment {
    Payment {
        chat_id: ChatId(user_id),
        payer_id: Some(user_id),
        payload: payload.to_string(),
        charge_id: "charge-1".to_string(),
    }
}

fn message_json(user_id: i64, message_id: i32) -> Value {
    json!({
        "message_id": message_id,
        "date": 1_700_000_000,
        "chat": {"id": user_id, "type": "private", "first_name": "Test"},
        "from": user_json(user_id),
    })
}

pub fn command_update(user_id: i64, command: &str) -> Value {
    let mut message = message_json(user_id, 10);
    message["text"] = json!(command);
    message["entities"] = json!([{"type": "bot_command", "offset": 0, "length": command.len()}]);
    json!({"update_id": 1, "message": message})
}

pub fn text_update(user_id: i64, text: &str) -> Value {
    let mut message = message_json(user_id, 11);
    message["text"] = json!(text);
    json!({"update_id": 2, "message": message})
}

pub fn callback_update(user_id: i64, data: &str) -> Value {
    let mut message = message_json(user_id, WELCOME_MESSAGE_ID);
    message["text"] = json!("Welcome");
    json!({
        "update_id": 3,
        "callback_query": {
            "id": format!("cb-{}", user_id),
            "from": user_json(user_id),
            "chat_instance": "instance",
            "message": message,
            "data": data
        }
    })
}

pub fn pre_checkout_update(user_id: i64, payload: &str) -> Value {
    json!({
        "update_id": 4,
        "pre_checkout_query": {
            "id": format!("pc-{}", user_id),
            "from": user_json(user_id),
            "currency": "XTR",
            "total_amount": PRICE,
            "invoice_payload": payload
        }
    })
}

pub fn successful_payment_update(user_id: i64, payload: &str) -> Value {
    let mut message = message_json(user_id, 12);
    message["successful_payment"] = json!({
        "currency": "XTR",
        "total_amount": PRICE,
        "invoice_payload": payload,
        "is_recurring": false,
        "is_first_recurring": false,
        "telegram_payment_charge_id": "charge-1",
        "provider_payment_charge_id": ""
    });
    json!({"update_id": 5, "message": message})
}
