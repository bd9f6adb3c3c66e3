//! Records persisted in the key-value store

use serde::{Deserialize, Serialize};
use teloxide::types::User;

/// A bot user, stored as JSON under `{env}_user_{id}`.
///
/// Field names follow the camelCase layout already present in production data;
/// every flag and id defaults so older records still parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub is_have_access: bool,
    #[serde(default)]
    pub is_early_bird: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_message_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_message_id: Option<i32>,
}

impl UserRecord {
    /// Fresh record for a user seen for the first time.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            language_code: String::new(),
            is_have_access: false,
            is_early_bird: false,
            invoice_message_id: None,
            start_message_id: None,
        }
    }

    /// Copies the identity fields of an inbound Telegram user.
    pub fn from_telegram(user: &User) -> Self {
        Self {
            username: user.username.clone().unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
            language_code: user.language_code.clone().unwrap_or_default(),
            ..Self::new(user_id_of(user))
        }
    }
}

/// Telegram user ids fit in `i64`; the store and payloads use the signed form.
pub fn user_id_of(user: &User) -> i64 {
    i64::try_from(user.id.0).unwrap_or(i64::MAX)
}

/// One answered question: `[question, selected option]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollAnswer(pub String, pub String);

impl PollAnswer {
    pub fn new(question: impl Into<String>, option: impl Into<String>) -> Self {
        Self(question.into(), option.into())
    }
}

/// Result of a compare-and-append on a user's poll answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAppend {
    /// The answer was stored; `answered` is the new number of answers.
    Appended { answered: usize },
    /// Another answer already occupies this question's slot; nothing was written.
    SlotTaken { answered: usize },
}

/// Result of the atomic access grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Access was granted; `rank` is the post-increment seat counter.
    Granted { rank: u64, user: UserRecord },
    /// The record already had access; the counter was not touched.
    AlreadyGranted,
    /// Every seat was taken before this grant; nothing was written.
    SoldOut,
    UserNotFound,
}
