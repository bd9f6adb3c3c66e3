//! Key-value storage for users, poll answers and the early access counter
//!
//! Flows talk to the [`Store`] trait. Production uses [`RedisStore`]; tests and
//! local runs with `REDIS_URL=memory://` use [`MemoryStore`]. Multi-step updates (poll
//! append, access grant, invoice bookkeeping) are single atomic operations in
//! both implementations.

pub mod memory;
pub mod models;
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::{Config, Environment};
use crate::core::error::AppResult;

pub use memory::MemoryStore;
pub use models::{GrantOutcome, PollAnswer, PollAppend, UserRecord};
pub use redis_store::RedisStore;

/// Environment-namespaced key names.
#[derive(Debug, Clone)]
pub struct Keyspace {
    prefix: String,
}

impl Keyspace {
    pub fn new(environment: Environment) -> Self {
        Self {
            prefix: environment.as_ref().to_string(),
        }
    }

    /// Keys under an arbitrary prefix, e.g. a throwaway namespace on a shared server.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn user(&self, user_id: i64) -> String {
        format!("{}_user_{}", self.prefix, user_id)
    }

    /// SCAN pattern matching every user record
    pub fn user_pattern(&self) -> String {
        format!("{}_user_*", self.prefix)
    }

    /// Hash of poll answers keyed by user id
    pub fn poll(&self) -> String {
        format!("{}_ai_sybil_poll", self.prefix)
    }

    pub fn early_access_count(&self) -> String {
        format!("{}_early_access_count", self.prefix)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, user_id: i64) -> AppResult<Option<UserRecord>>;

    /// Writes the record only if none exists. Returns `true` when it was created.
    async fn create_user(&self, user: &UserRecord) -> AppResult<bool>;

    /// Records the invoice message (and the welcome message to rewrite later).
    /// Returns `false` when the user has no record.
    async fn set_invoice_messages(
        &self,
        user_id: i64,
        invoice_message_id: i32,
        start_message_id: Option<i32>,
    ) -> AppResult<bool>;

    /// Sets `isHaveAccess`/`isEarlyBird` and increments the seat counter, once,
    /// while fewer than `max_count` seats are taken.
    async fn grant_early_access(&self, user_id: i64, max_count: u64) -> AppResult<GrantOutcome>;

    async fn early_access_count(&self) -> AppResult<u64>;

    async fn poll_answers(&self, user_id: i64) -> AppResult<Vec<PollAnswer>>;

    /// Appends `answer` only if exactly `question_index` answers are stored.
    async fn append_poll_answer(&self, user_id: i64, question_index: usize, answer: &PollAnswer)
        -> AppResult<PollAppend>;

    async fn all_users(&self) -> AppResult<Vec<UserRecord>>;

    async fn all_poll_answers(&self) -> AppResult<Vec<Vec<PollAnswer>>>;
}

/// `REDIS_URL` value selecting the in-process store
pub const MEMORY_URL: &str = "memory://";

/// Opens the configured store: `None` without `REDIS_URL`, [`MemoryStore`] for
/// `memory://`, otherwise a checked Redis connection.
pub async fn connect(config: &Config) -> AppResult<Option<Arc<dyn Store>>> {
    let Some(url) = config.redis_url.as_deref() else {
        tracing::warn!("REDIS_URL is not set, handlers will report the store as unavailable");
        return Ok(None);
    };

    if url == MEMORY_URL {
        tracing::warn!("Using the in-memory store, data is lost on restart");
        return Ok(Some(Arc::new(MemoryStore::new())));
    }

    let store = RedisStore::connect(url, Keyspace::new(config.environment)).await?;
    Ok(Some(Arc::new(store)))
}
