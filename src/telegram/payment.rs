//! Early bird sales: invoice, pre-checkout validation and access grant
//!
//! Payments are Telegram Stars invoices. A seat is granted exactly once per
//! user by the store's atomic grant; the post-increment seat counter becomes
//! the user's rank and is shown as a badge on their welcome message.

use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, MessageId, PreCheckoutQueryId};

use crate::core::content;
use crate::core::error::{AppError, AppResult};
use crate::storage::GrantOutcome;
use crate::telegram::api::Invoice;
use crate::telegram::context::{ButtonPress, FlowContext};
use crate::telegram::keyboards;
use crate::telegram::onboarding::seats_left;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentAction {
    #[serde(rename = "buyEarlyBirdAccess")]
    BuyEarlyBirdAccess,
    #[serde(other)]
    Unknown,
}

/// JSON carried through the invoice, e.g. `{"userId":1,"action":"buyEarlyBirdAccess"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub user_id: i64,
    pub action: PaymentAction,
}

impl InvoicePayload {
    pub fn early_bird(user_id: i64) -> Self {
        Self {
            user_id,
            action: PaymentAction::BuyEarlyBirdAccess,
        }
    }

    pub fn parse(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw).map_err(|e| AppError::Payload(e.to_string()))
    }

    pub fn encode(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A pre-checkout query, reduced to what validation needs.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub query_id: PreCheckoutQueryId,
    /// The paying user
    pub user_id: i64,
    pub payload: String,
}

/// A `successful_payment` service message.
#[derive(Debug, Clone)]
pub struct Payment {
    pub chat_id: ChatId,
    pub payer_id: Option<i64>,
    pub payload: String,
    /// Telegram charge id, needed to refund the Stars
    pub charge_id: String,
}

/// `get_early_access` / `become_an_early_bird`: send the invoice.
pub async fn handle_get_early_access(ctx: FlowContext<'_>, press: &ButtonPress) -> AppResult<()> {
    let Some(store) = ctx.store else {
        ctx.api.answer_callback(&press.query_id, Some(content::GENERIC_ERROR)).await?;
        return Ok(());
    };

    let user = store.get_user(press.user_id).await?;
    let price = match (&user, ctx.config.early_bird_price) {
        (None, _) => return reject_button(ctx, press, content::USER_NOT_FOUND).await,
        (Some(user), _) if user.is_have_access => return reject_button(ctx, press, content::ALREADY_HAS_ACCESS).await,
        (Some(_), None) => return reject_button(ctx, press, content::SALES_DISABLED).await,
        (Some(_), Some(price)) => price,
    };
    if !seats_left(store, ctx.config.early_access_max_count).await? {
        return reject_button(ctx, press, content::SEATS_SOLD_OUT).await;
    }

    let invoice = Invoice {
        title: content::INVOICE_TITLE.to_string(),
        description: content::INVOICE_DESCRIPTION.to_string(),
        payload: InvoicePayload::early_bird(press.user_id).encode()?,
        label: content::INVOICE_LABEL.to_string(),
        amount: price,
    };
    let invoice_message = ctx.api.send_invoice(press.chat_id(), &invoice).await?;
    let start_message = press.message.map(|(_, message_id)| message_id.0);
    store
        .set_invoice_messages(press.user_id, invoice_message.0, start_message)
        .await?;

    tracing::info!(user_id = press.user_id, price, "Early bird invoice sent");
    ctx.api.answer_callback(&press.query_id, None).await?;
    Ok(())
}

async fn reject_button(ctx: FlowContext<'_>, press: &ButtonPress, reason: &str) -> AppResult<()> {
    tracing::info!(user_id = press.user_id, reason, "Early access request rejected");
    ctx.api.answer_callback(&press.query_id, Some(reason)).await
}

/// Approves or rejects a checkout. The query is answered even when validation fails.
pub async fn handle_pre_checkout(ctx: FlowContext<'_>, checkout: &Checkout) -> AppResult<()> {
    let verdict = match review_checkout(ctx, checkout).await {
        Ok(Ok(())) => None,
        Ok(Err(reason)) => Some(reason.to_string()),
        Err(e) => {
            tracing::error!(user_id = checkout.user_id, error = %e, "Pre-checkout validation failed");
            Some(e.to_string())
        }
    };

    match &verdict {
        None => tracing::info!(user_id = checkout.user_id, "Checkout approved"),
        Some(reason) => tracing::info!(user_id = checkout.user_id, reason = %reason, "Checkout rejected"),
    }
    ctx.api
        .answer_pre_checkout(&checkout.query_id, verdict.as_deref())
        .await
}

async fn review_checkout(ctx: FlowContext<'_>, checkout: &Checkout) -> AppResult<Result<(), &'static str>> {
    let payload = InvoicePayload::parse(&checkout.payload)?;
    let store = ctx.store()?;

    if payload.action == PaymentAction::Unknown {
        return Ok(Err(content::UNKNOWN_PAYMENT_ACTION));
    }
    if payload.user_id != checkout.user_id {
        return Ok(Err(content::FOREIGN_INVOICE));
    }
    let Some(user) = store.get_user(payload.user_id).await? else {
        return Ok(Err(content::USER_NOT_FOUND));
    };

    if let Some(invoice_message) = user.invoice_message_id {
        if let Err(e) = ctx.api.delete_message(ChatId(user.id), MessageId(invoice_message)).await {
            tracing::debug!(user_id = user.id, error = %e, "Invoice message already gone");
        }
    }

    if user.is_have_access {
        return Ok(Err(content::ALREADY_HAS_ACCESS));
    }
    if !seats_left(store, ctx.config.early_access_max_count).await? {
        return Ok(Err(content::SEATS_SOLD_OUT));
    }
    Ok(Ok(()))
}

/// Grants the seat after Telegram confirms the payment.
///
/// Telegram may deliver the same payment message more than once; only the
/// first delivery changes anything. A payment that lost the race for the last
/// seat is refunded.
pub async fn handle_successful_payment(ctx: FlowContext<'_>, paid: &Payment) -> AppResult<()> {
    let chat_id = paid.chat_id;
    let payer_id = paid.payer_id;
    let raw_payload = paid.payload.as_str();
    let payload = match InvoicePayload::parse(raw_payload) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(chat_id = chat_id.0, error = %e, "Unreadable payload in a successful payment");
            return Ok(());
        }
    };
    if payload.action == PaymentAction::Unknown {
        tracing::warn!(chat_id = chat_id.0, payload = raw_payload, "Successful payment for an unknown action");
        return Ok(());
    }
    if payer_id.is_some_and(|payer| payer != payload.user_id) {
        tracing::warn!(payer = ?payer_id, user_id = payload.user_id, "Payment made for another user");
    }

    let store = ctx.store()?;
    match store
        .grant_early_access(payload.user_id, ctx.config.early_access_max_count)
        .await?
    {
        GrantOutcome::UserNotFound => {
            tracing::error!(user_id = payload.user_id, "Paid user has no record");
        }
        GrantOutcome::SoldOut => {
            tracing::warn!(user_id = payload.user_id, charge_id = %paid.charge_id, "Seats sold out after checkout, refunding");
            let refunder = payer_id.unwrap_or(payload.user_id);
            if let Err(e) = ctx.api.refund_stars(refunder, &paid.charge_id).await {
                tracing::error!(user_id = refunder, charge_id = %paid.charge_id, error = %e, "Refund failed");
            }
            ctx.api
                .send_text(chat_id, content::SEATS_SOLD_OUT_REFUNDED, None, None)
                .await?;
        }
        GrantOutcome::AlreadyGranted => {
            tracing::info!(user_id = payload.user_id, "Duplicate payment delivery, access already granted");
        }
        GrantOutcome::Granted { rank, user } => {
            tracing::info!(user_id = user.id, rank, "Early bird access granted");

            if let Some(start_message) = user.start_message_id {
                if let Err(e) = ctx
                    .api
                    .edit_keyboard(ChatId(user.id), MessageId(start_message), keyboards::badge_keyboard(rank))
                    .await
                {
                    tracing::warn!(user_id = user.id, error = %e, "Failed to put the badge on the welcome message");
                }
            }

            let keyboard = ctx.config.team_contact_url.as_ref().map(keyboards::contact_keyboard);
            ctx.api
                .send_text(chat_id, &content::early_bird_congrats(rank), None, keyboard)
                .await?;
        }
    }
    Ok(())
}

/// `early_bird_access_done`: the badge button does nothing.
pub async fn handle_badge_press(ctx: FlowContext<'_>, press: &ButtonPress) -> AppResult<()> {
    ctx.api.answer_callback(&press.query_id, None).await
}
