//! Admin-only `/getStats`

use teloxide::types::ChatId;

use crate::core::content::{self, POLL_QUESTIONS};
use crate::core::error::AppResult;
use crate::storage::Store;
use crate::telegram::context::FlowContext;

/// Check if user is admin
pub fn is_admin(admin_ids: &[i64], user_id: i64) -> bool {
    admin_ids.contains(&user_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total_users: usize,
    pub users_with_access: usize,
    pub early_birds: usize,
    pub seats_taken: u64,
    pub seats_total: u64,
    pub poll_completions: usize,
}

impl Stats {
    pub async fn collect(store: &dyn Store, seats_total: u64) -> AppResult<Self> {
        let users = store.all_users().await?;
        let polls = store.all_poll_answers().await?;

        Ok(Self {
            total_users: users.len(),
            users_with_access: users.iter().filter(|user| user.is_have_access).count(),
            early_birds: users.iter().filter(|user| user.is_early_bird).count(),
            seats_taken: store.early_access_count().await?,
            seats_total,
            poll_completions: polls
                .iter()
                .filter(|answers| answers.len() >= POLL_QUESTIONS.len())
                .count(),
        })
    }

    pub fn render(&self) -> String {
        format!(
            "Total users: {}\nUsers with early bird access: {}\nEarly birds: {}\nEarly access seats: {}/{}\nPoll completions: {}",
            self.total_users,
            self.users_with_access,
            self.early_birds,
            self.seats_taken,
            self.seats_total,
            self.poll_completions
        )
    }
}

/// `/getStats`. The admin check runs before any store access.
pub async fn handle_get_stats(ctx: FlowContext<'_>, chat_id: ChatId, from_id: Option<i64>) -> AppResult<()> {
    if !from_id.is_some_and(|id| is_admin(&ctx.config.admin_ids, id)) {
        tracing::info!(user_id = ?from_id, "Rejected /getStats from a non-admin");
        ctx.api.send_text(chat_id, content::NOT_AN_ADMIN, None, None).await?;
        return Ok(());
    }

    let Some(store) = ctx.store else {
        ctx.api.send_text(chat_id, content::SERVICE_UNAVAILABLE, None, None).await?;
        return Ok(());
    };

    let stats = Stats::collect(store, ctx.config.early_access_max_count).await?;
    tracing::info!(?stats, "Stats requested");
    ctx.api.send_text(chat_id, &stats.render(), None, None).await?;
    Ok(())
}
