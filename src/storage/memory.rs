//! In-process [`Store`] used by tests and by local runs with `REDIS_URL=memory://`.
//!
//! All state sits behind one mutex, so every operation is atomic the same way
//! the Redis scripts are.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Store;
use super::models::{GrantOutcome, PollAnswer, PollAppend, UserRecord};
use crate::core::error::AppResult;

#[derive(Default)]
struct State {
    users: HashMap<i64, UserRecord>,
    poll: HashMap<i64, Vec<PollAnswer>>,
    early_access_count: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    operations: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Overwrites a user record without counting as an operation.
    pub async fn seed_user(&self, user: UserRecord) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Overwrites a user's poll answers without counting as an operation.
    pub async fn seed_poll_answers(&self, user_id: i64, answers: Vec<PollAnswer>) {
        self.state.lock().await.poll.insert(user_id, answers);
    }

    /// Sets the seat counter without counting as an operation.
    pub async fn seed_early_access_count(&self, count: u64) {
        self.state.lock().await.early_access_count = count;
    }

    fn touch(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: i64) -> AppResult<Option<UserRecord>> {
        self.touch();
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn create_user(&self, user: &UserRecord) -> AppResult<bool> {
        self.touch();
        let mut state = self.state.lock().await;
        if state.users.contains_key(&user.id) {
            return Ok(false);
        }
        state.users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn set_invoice_messages(
        &self,
        user_id: i64,
        invoice_message_id: i32,
        start_message_id: Option<i32>,
    ) -> AppResult<bool> {
        self.touch();
        let mut state = self.state.lock().await;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        user.invoice_message_id = Some(invoice_message_id);
        if start_message_id.is_some() {
            user.start_message_id = start_message_id;
        }
        Ok(true)
    }

    async fn grant_early_access(&self, user_id: i64, max_count: u64) -> AppResult<GrantOutcome> {
        self.touch();
        let mut state = self.state.lock().await;
        let seats_taken = state.early_access_count;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(GrantOutcome::UserNotFound);
        };
        if user.is_have_access {
            return Ok(GrantOutcome::AlreadyGranted);
        }
        if seats_taken >= max_count {
            return Ok(GrantOutcome::SoldOut);
        }
        user.is_have_access = true;
        user.is_early_bird = true;
        let user = user.clone();
        state.early_access_count += 1;
        Ok(GrantOutcome::Granted {
            rank: state.early_access_count,
            user,
        })
    }

    async fn early_access_count(&self) -> AppResult<u64> {
        self.touch();
        Ok(self.state.lock().await.early_access_count)
    }

    async fn poll_answers(&self, user_id: i64) -> AppResult<Vec<PollAnswer>> {
        self.touch();
        Ok(self.state.lock().await.poll.get(&user_id).cloned().unwrap_or_default())
    }

    async fn append_poll_answer(
        &self,
        user_id: i64,
        question_index: usize,
        answer: &PollAnswer,
    ) -> AppResult<PollAppend> {
        self.touch();
        let mut state = self.state.lock().await;
        let answers = state.poll.entry(user_id).or_default();
        if answers.len() != question_index {
            return Ok(PollAppend::SlotTaken {
                answered: answers.len(),
            });
        }
        answers.push(answer.clone());
        Ok(PollAppend::Appended {
            answered: answers.len(),
        })
    }

    async fn all_users(&self) -> AppResult<Vec<UserRecord>> {
        self.touch();
        let mut users: Vec<UserRecord> = self.state.lock().await.users.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn all_poll_answers(&self) -> AppResult<Vec<Vec<PollAnswer>>> {
        self.touch();
        Ok(self.state.lock().await.poll.values().cloned().collect())
    }
}
