//! Inline keyboards and the callback data they carry

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

use crate::core::content::{self, PollQuestion};

pub const GET_ACCESS: &str = "get_access";
pub const GET_EARLY_ACCESS: &str = "get_early_access";
/// Older welcome messages still carry this trigger
pub const BECOME_AN_EARLY_BIRD: &str = "become_an_early_bird";
pub const EARLY_BIRD_ACCESS_DONE: &str = "early_bird_access_done";
pub const POLL_PREFIX: &str = "poll:";

/// Routing decision for a button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackData {
    GetAccess,
    GetEarlyAccess,
    EarlyBirdDone,
    /// Raw `poll:` data, parsed strictly by the poll flow
    Poll(String),
    Unknown,
}

impl CallbackData {
    pub fn parse(data: &str) -> Self {
        match data {
            GET_ACCESS => CallbackData::GetAccess,
            GET_EARLY_ACCESS | BECOME_AN_EARLY_BIRD => CallbackData::GetEarlyAccess,
            EARLY_BIRD_ACCESS_DONE => CallbackData::EarlyBirdDone,
            _ if data.starts_with(POLL_PREFIX) => CallbackData::Poll(data.to_string()),
            _ => CallbackData::Unknown,
        }
    }
}

/// Welcome keyboard; rows are dropped for journeys no longer offered.
pub fn start_keyboard(offer_poll: bool, offer_early_access: bool) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();
    if offer_poll {
        rows.push(vec![InlineKeyboardButton::callback(content::APPLY_FOR_BETA_BUTTON, GET_ACCESS)]);
    }
    if offer_early_access {
        rows.push(vec![InlineKeyboardButton::callback(
            content::GET_EARLY_ACCESS_BUTTON,
            GET_EARLY_ACCESS,
        )]);
    }
    InlineKeyboardMarkup::new(rows)
}

pub fn poll_data(question_index: usize, option_index: usize) -> String {
    format!("{}{}_{}", POLL_PREFIX, question_index, option_index)
}

/// One option per row.
pub fn poll_keyboard(question_index: usize, question: &PollQuestion) -> InlineKeyboardMarkup {
    let rows = question
        .options
        .iter()
        .enumerate()
        .map(|(option_index, option)| {
            vec![InlineKeyboardButton::callback(
                *option,
                poll_data(question_index, option_index),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Replaces the welcome buttons once the user has paid.
pub fn badge_keyboard(rank: u64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        content::early_bird_badge(rank),
        EARLY_BIRD_ACCESS_DONE,
    )]])
}

pub fn contact_keyboard(url: &Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        content::CONTACT_TEAM_BUTTON,
        url.clone(),
    )]])
}
