//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Message, PreCheckoutQuery};

use super::types::{HandlerDeps, HandlerError, SharedApi};
use crate::storage::models::user_id_of;
use crate::telegram::bot::Command;
use crate::telegram::context::ButtonPress;
use crate::telegram::keyboards::CallbackData;
use crate::telegram::payment::{Checkout, Payment};
use crate::telegram::{admin, onboarding, payment, poll};

/// Creates the handler tree for the bot.
///
/// The webhook builds it once and dispatches every update through it with a
/// [`SharedApi`] dependency, so tests can run the same tree against a fake API.
///
/// # Arguments
/// * `deps` - Handler dependencies (config, store, bot username)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        // Successful payment handler must be first
        .branch(successful_payment_handler(deps.clone()))
        .branch(command_handler(deps.clone()))
        .branch(message_fallback_handler())
        .branch(pre_checkout_handler(deps.clone()))
        .branch(callback_handler(deps))
}

/// Handler for successful Telegram payments
fn successful_payment_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.successful_payment().is_some())
        .endpoint(move |api: SharedApi, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(paid) = msg.successful_payment() else {
                    return Ok(());
                };
                tracing::info!(
                    chat_id = msg.chat.id.0,
                    currency = %paid.currency,
                    amount = paid.total_amount,
                    "Received successful_payment message"
                );
                let payment = Payment {
                    chat_id: msg.chat.id,
                    payer_id: msg.from.as_ref().map(user_id_of),
                    payload: paid.invoice_payload.clone(),
                    charge_id: paid.telegram_payment_charge_id.0.clone(),
                };
                payment::handle_successful_payment(deps.flow(api.as_ref()), &payment).await?;
                Ok(())
            }
        })
}

/// Handler for `/start` and `/getStats`
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let parse_deps = deps.clone();

    Update::filter_message()
        .filter_map_async(move |api: SharedApi, msg: Message| {
            let deps = parse_deps.clone();
            async move {
                let text = msg.text()?;
                deps.command(api.as_ref(), text).await
            }
        })
        .endpoint(move |api: SharedApi, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let ctx = deps.flow(api.as_ref());
                let from_id = msg.from.as_ref().map(user_id_of);
                tracing::info!(command = ?cmd, user_id = ?from_id, "Command received");

                match cmd {
                    Command::Start => onboarding::handle_start(ctx, msg.chat.id, msg.from.as_ref()).await?,
                    Command::GetStats => admin::handle_get_stats(ctx, msg.chat.id, from_id).await?,
                }
                Ok(())
            }
        })
}

/// Any other message is only logged
fn message_fallback_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(|msg: Message| async move {
        tracing::debug!(chat_id = msg.chat.id.0, message_id = msg.id.0, "Ignoring message");
        Ok(())
    })
}

/// Handler for pre-checkout queries (Telegram payments)
fn pre_checkout_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_pre_checkout_query().endpoint(move |api: SharedApi, query: PreCheckoutQuery| {
        let deps = deps.clone();
        async move {
            let checkout = Checkout {
                query_id: query.id.clone(),
                user_id: user_id_of(&query.from),
                payload: query.invoice_payload.clone(),
            };
            tracing::info!(user_id = checkout.user_id, payload = %checkout.payload, "Received pre_checkout_query");

            payment::handle_pre_checkout(deps.flow(api.as_ref()), &checkout).await?;
            Ok(())
        }
    })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |api: SharedApi, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let ctx = deps.flow(api.as_ref());
            let press = ButtonPress {
                query_id: q.id.clone(),
                user_id: user_id_of(&q.from),
                message: q.regular_message().map(|m| (m.chat.id, m.id)),
            };
            let data = q.data.as_deref().unwrap_or_default();
            tracing::debug!(user_id = press.user_id, data, "Callback received");

            match CallbackData::parse(data) {
                CallbackData::GetAccess => poll::handle_get_access(ctx, &press).await?,
                CallbackData::Poll(raw) => poll::handle_answer(ctx, &press, &raw).await?,
                CallbackData::GetEarlyAccess => payment::handle_get_early_access(ctx, &press).await?,
                CallbackData::EarlyBirdDone => payment::handle_badge_press(ctx, &press).await?,
                CallbackData::Unknown => ctx.api.answer_callback(&press.query_id, None).await?,
            }
            Ok(())
        }
    })
}
