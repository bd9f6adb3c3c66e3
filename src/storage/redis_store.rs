//! Redis-backed [`Store`]
//!
//! One multiplexed connection is opened at startup and cloned per command.
//! Read-modify-write updates run as Lua scripts so concurrent deliveries of
//! the same update cannot interleave.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

use super::models::{GrantOutcome, PollAnswer, PollAppend, UserRecord};
use super::{Keyspace, Store};
use crate::core::error::{AppError, AppResult};

/// KEYS[1] = user key, KEYS[2] = counter key, ARGV[1] = seat cap.
/// Returns the new counter value, 0 when access was already granted, -1 when the user is missing,
/// -2 when the counter already reached the cap.
const GRANT_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return -1
end
local user = cjson.decode(raw)
if user['isHaveAccess'] == true then
  return 0
end
if tonumber(redis.call('GET', KEYS[2]) or '0') >= tonumber(ARGV[1]) then
  return -2
end
user['isHaveAccess'] = true
user['isEarlyBird'] = true
redis.call('SET', KEYS[1], cjson.encode(user))
return redis.call('INCR', KEYS[2])
"#;

/// KEYS[1] = poll hash, ARGV = user id, expected answer count, answer JSON.
/// Returns the new answer count, or `-1 - current count` when the slot is taken.
const APPEND_ANSWER_SCRIPT: &str = r#"
local raw = redis.call('HGET', KEYS[1], ARGV[1])
local answers = {}
if raw then
  answers = cjson.decode(raw)
end
local answered = #answers
if answered ~= tonumber(ARGV[2]) then
  return -1 - answered
end
table.insert(answers, cjson.decode(ARGV[3]))
redis.call('HSET', KEYS[1], ARGV[1], cjson.encode(answers))
return answered + 1
"#;

/// KEYS[1] = user key, ARGV = invoice message id, start message id ('' to keep).
const INVOICE_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return 0
end
local user = cjson.decode(raw)
user['invoiceMessageId'] = tonumber(ARGV[1])
if ARGV[2] ~= '' then
  user['startMessageId'] = tonumber(ARGV[2])
end
redis.call('SET', KEYS[1], cjson.encode(user))
return 1
"#;

const SCAN_BATCH: usize = 200;

pub struct RedisStore {
    conn: MultiplexedConnection,
    keys: Keyspace,
    grant: Script,
    append_answer: Script,
    invoice: Script,
}

impl RedisStore {
    /// Opens the connection and checks it with `PING`.
    pub async fn connect(url: &str, keys: Keyspace) -> AppResult<Self> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!(reply = %pong, "Connected to Redis");

        Ok(Self {
            conn,
            keys,
            grant: Script::new(GRANT_SCRIPT),
            append_answer: Script::new(APPEND_ANSWER_SCRIPT),
            invoice: Script::new(INVOICE_SCRIPT),
        })
    }

    fn conn(&self) -> MultiplexedConnection {
        self.conn.clone()
    }

    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut conn = self.conn();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

fn parse_answers(raw: &str) -> AppResult<Vec<PollAnswer>> {
    Ok(serde_json::from_str(raw)?)
}

#[async_trait]
impl Store for RedisStore {
    async fn get_user(&self, user_id: i64) -> AppResult<Option<UserRecord>> {
        let mut conn = self.conn();
        let raw: Option<String> = conn.get(self.keys.user(user_id)).await?;
        raw.map(|raw| serde_json::from_str(&raw).map_err(AppError::from)).transpose()
    }

    async fn create_user(&self, user: &UserRecord) -> AppResult<bool> {
        let mut conn = self.conn();
        let json = serde_json::to_string(user)?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.keys.user(user.id))
            .arg(json)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn set_invoice_messages(
        &self,
        user_id: i64,
        invoice_message_id: i32,
        start_message_id: Option<i32>,
    ) -> AppResult<bool> {
        let mut conn = self.conn();
        let start = start_message_id.map(|id| id.to_string()).unwrap_or_default();
        let updated: i64 = self
            .invoice
            .key(self.keys.user(user_id))
            .arg(invoice_message_id)
            .arg(start)
            .invoke_async(&mut conn)
            .await?;
        Ok(updated == 1)
    }

    async fn grant_early_access(&self, user_id: i64, max_count: u64) -> AppResult<GrantOutcome> {
        let mut conn = self.conn();
        let rank: i64 = self
            .grant
            .key(self.keys.user(user_id))
            .key(self.keys.early_access_count())
            .arg(max_count)
            .invoke_async(&mut conn)
            .await?;

        match rank {
            -2 => Ok(GrantOutcome::SoldOut),
            -1 => Ok(GrantOutcome::UserNotFound),
            0 => Ok(GrantOutcome::AlreadyGranted),
            rank => {
                let user = self.get_user(user_id).await?.ok_or_else(|| {
                    AppError::Payload(format!("user {} disappeared after the access grant", user_id))
                })?;
                Ok(GrantOutcome::Granted {
                    rank: rank.unsigned_abs(),
                    user,
                })
            }
        }
    }

    async fn early_access_count(&self) -> AppResult<u64> {
        let mut conn = self.conn();
        let count: Option<u64> = conn.get(self.keys.early_access_count()).await?;
        Ok(count.unwrap_or(0))
    }

    async fn poll_answers(&self, user_id: i64) -> AppResult<Vec<PollAnswer>> {
        let mut conn = self.conn();
        let raw: Option<String> = conn.hget(self.keys.poll(), user_id).await?;
        match raw {
            Some(raw) => parse_answers(&raw),
            None => Ok(Vec::new()),
        }
    }

    async fn append_poll_answer(
        &self,
        user_id: i64,
        question_index: usize,
        answer: &PollAnswer,
    ) -> AppResult<PollAppend> {
        let mut conn = self.conn();
        let reply: i64 = self
            .append_answer
            .key(self.keys.poll())
            .arg(user_id)
            .arg(question_index)
            .arg(serde_json::to_string(answer)?)
            .invoke_async(&mut conn)
            .await?;

        let outcome = if reply > 0 {
            PollAppend::Appended {
                answered: usize::try_from(reply).unwrap_or(usize::MAX),
            }
        } else {
            PollAppend::SlotTaken {
                answered: usize::try_from(-1 - reply).unwrap_or(0),
            }
        };
        Ok(outcome)
    }

    async fn all_users(&self) -> AppResult<Vec<UserRecord>> {
        let keys = self.scan_keys(&self.keys.user_pattern()).await?;
        let mut users = Vec::with_capacity(keys.len());
        let mut conn = self.conn();

        for chunk in keys.chunks(SCAN_BATCH) {
            let values: Vec<Option<String>> = redis::cmd("MGET").arg(chunk).query_async(&mut conn).await?;
            for (key, value) in chunk.iter().zip(values) {
                let Some(raw) = value else { continue };
                match serde_json::from_str::<UserRecord>(&raw) {
                    Ok(user) => users.push(user),
                    Err(e) => tracing::warn!(key = %key, error = %e, "Skipping unparsable user record"),
                }
            }
        }

        Ok(users)
    }

    async fn all_poll_answers(&self) -> AppResult<Vec<Vec<PollAnswer>>> {
        let mut conn = self.conn();
        let values: Vec<String> = conn.hvals(self.keys.poll()).await?;
        let mut sets = Vec::with_capacity(values.len());
        for raw in values {
            match parse_answers(&raw) {
                Ok(answers) => sets.push(answers),
                Err(e) => tracing::warn!(error = %e, "Skipping unparsable poll answers"),
            }
        }
        Ok(sets)
    }
}
