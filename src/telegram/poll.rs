//! "Apply for beta" poll
//!
//! The poll lives in a single message that is edited after every answer: the
//! answered questions are listed with ✅ and the next question is shown in
//! italics with its options as buttons. Answers are stored with a
//! compare-and-append, so a double tap or a stale keyboard cannot record the
//! same question twice.

use teloxide::types::ParseMode;
use thiserror::Error;

use crate::core::content::{self, POLL_QUESTIONS};
use crate::core::error::AppResult;
use crate::storage::{PollAnswer, PollAppend};
use crate::telegram::context::{ButtonPress, FlowContext};
use crate::telegram::keyboards;
use crate::telegram::markdown::{escape_markdown, italic};
use crate::telegram::onboarding::seats_left;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollDataError {
    #[error("malformed poll data: {0}")]
    Malformed(String),
    #[error("poll answer out of range: question {question}, option {option}")]
    OutOfRange { question: usize, option: usize },
}

/// Parses `poll:{question}_{option}` and checks both indexes against the catalog.
pub fn parse_poll_data(data: &str) -> Result<(usize, usize), PollDataError> {
    let malformed = || PollDataError::Malformed(data.to_string());

    let rest = data.strip_prefix(keyboards::POLL_PREFIX).ok_or_else(malformed)?;
    let (question, option) = rest.split_once('_').ok_or_else(malformed)?;
    let question = parse_index(question).ok_or_else(malformed)?;
    let option = parse_index(option).ok_or_else(malformed)?;

    match POLL_QUESTIONS.get(question) {
        Some(entry) if option < entry.options.len() => Ok((question, option)),
        _ => Err(PollDataError::OutOfRange { question, option }),
    }
}

fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// MarkdownV2 poll message: intro, answered questions, then the next question if any.
pub fn render_poll(answers: &[PollAnswer]) -> String {
    let mut text = escape_markdown(content::POLL_INTRO);
    for PollAnswer(question, option) in answers {
        text.push_str(&format!("\n\n{}\n✅ {}", escape_markdown(question), escape_markdown(option)));
    }
    if let Some(next) = POLL_QUESTIONS.get(answers.len()) {
        text.push_str("\n\n");
        text.push_str(&italic(next.question));
    }
    text
}

/// `get_access`: start (or resume) the poll.
pub async fn handle_get_access(ctx: FlowContext<'_>, press: &ButtonPress) -> AppResult<()> {
    let Some(store) = ctx.store else {
        ctx.api.answer_callback(&press.query_id, Some(content::GENERIC_ERROR)).await?;
        return Ok(());
    };

    let answers = store.poll_answers(press.user_id).await?;
    let chat_id = press.chat_id();

    if answers.len() >= POLL_QUESTIONS.len() {
        ctx.api
            .send_text(chat_id, content::POLL_ALREADY_COMPLETED, None, None)
            .await?;
        ctx.api.answer_callback(&press.query_id, None).await?;
        return Ok(());
    }

    if let Some((chat_id, message_id)) = press.message {
        let has_access = store
            .get_user(press.user_id)
            .await?
            .is_some_and(|user| user.is_have_access);
        let offer_early_access = !has_access && seats_left(store, ctx.config.early_access_max_count).await?;
        let keyboard = keyboards::start_keyboard(false, offer_early_access);
        // The welcome message may be too old to edit; the poll still starts.
        if let Err(e) = ctx.api.edit_keyboard(chat_id, message_id, keyboard).await {
            tracing::warn!(user_id = press.user_id, error = %e, "Failed to remove the poll button");
        }
    }

    let question_index = answers.len();
    ctx.api
        .send_text(
            chat_id,
            &render_poll(&answers),
            Some(ParseMode::MarkdownV2),
            Some(keyboards::poll_keyboard(question_index, &POLL_QUESTIONS[question_index])),
        )
        .await?;
    ctx.api.answer_callback(&press.query_id, None).await?;
    Ok(())
}

/// `poll:{i}_{j}`: record one answer and advance the poll message.
pub async fn handle_answer(ctx: FlowContext<'_>, press: &ButtonPress, data: &str) -> AppResult<()> {
    let (question_index, option_index) = match parse_poll_data(data) {
        Ok(indexes) => indexes,
        Err(e) => {
            tracing::warn!(user_id = press.user_id, error = %e, "Rejected poll callback");
            ctx.api.answer_callback(&press.query_id, Some(content::POLL_INVALID_DATA)).await?;
            return Ok(());
        }
    };

    let (Some((chat_id, message_id)), Some(store)) = (press.message, ctx.store) else {
        ctx.api.answer_callback(&press.query_id, Some(content::GENERIC_ERROR)).await?;
        return Ok(());
    };

    let entry = &POLL_QUESTIONS[question_index];
    let answer = PollAnswer::new(entry.question, entry.options[option_index]);

    let answered = match store.append_poll_answer(press.user_id, question_index, &answer).await? {
        PollAppend::Appended { answered } => answered,
        PollAppend::SlotTaken { answered } => {
            tracing::debug!(user_id = press.user_id, question_index, answered, "Poll slot already taken");
            ctx.api
                .answer_callback(&press.query_id, Some(content::POLL_ALREADY_ANSWERED))
                .await?;
            return Ok(());
        }
    };

    let answers = store.poll_answers(press.user_id).await?;
    let text = render_poll(&answers);

    if answered >= POLL_QUESTIONS.len() {
        ctx.api
            .edit_text(chat_id, message_id, &text, Some(ParseMode::MarkdownV2), None)
            .await?;
        ctx.api.send_text(chat_id, content::POLL_COMPLETED, None, None).await?;
        tracing::info!(user_id = press.user_id, "Poll completed");
    } else {
        ctx.api
            .edit_text(
                chat_id,
                message_id,
                &text,
                Some(ParseMode::MarkdownV2),
                Some(keyboards::poll_keyboard(answered, &POLL_QUESTIONS[answered])),
            )
            .await?;
    }

    ctx.api.answer_callback(&press.query_id, None).await?;
    Ok(())
}
