//! `/start`: register the user and send the welcome message

use teloxide::types::{ChatId, ParseMode, User};

use crate::core::content;
use crate::core::error::AppResult;
use crate::storage::{Store, UserRecord};
use crate::telegram::context::FlowContext;
use crate::telegram::keyboards;

/// Handles `/start` in `chat_id`. `from` is `None` for anonymous senders.
pub async fn handle_start(ctx: FlowContext<'_>, chat_id: ChatId, from: Option<&User>) -> AppResult<()> {
    let Some(from) = from else {
        ctx.api.send_text(chat_id, content::PRIVATE_CHAT_ONLY, None, None).await?;
        return Ok(());
    };

    let Some(store) = ctx.store else {
        tracing::warn!(chat_id = chat_id.0, "Store is not configured, /start degraded");
        ctx.api.send_text(chat_id, content::SERVICE_UNAVAILABLE, None, None).await?;
        return Ok(());
    };

    let record = UserRecord::from_telegram(from);
    let has_access = if store.create_user(&record).await? {
        tracing::info!(user_id = record.id, username = %record.username, "New user registered");
        false
    } else {
        store.get_user(record.id).await?.is_some_and(|user| user.is_have_access)
    };

    let offer_early_access = !has_access && seats_left(store, ctx.config.early_access_max_count).await?;
    let keyboard = keyboards::start_keyboard(true, offer_early_access);

    match ctx.config.welcome_animation.as_deref() {
        Some(animation) => {
            ctx.api
                .send_animation(chat_id, animation, content::WELCOME_CAPTION, Some(keyboard))
                .await?;
        }
        None => {
            ctx.api
                .send_text(chat_id, content::START_MESSAGE, Some(ParseMode::Html), Some(keyboard))
                .await?;
        }
    }

    Ok(())
}

/// `true` while the seat counter is below the cap.
pub async fn seats_left(store: &dyn Store, max_count: u64) -> AppResult<bool> {
    Ok(store.early_access_count().await? < max_count)
}
