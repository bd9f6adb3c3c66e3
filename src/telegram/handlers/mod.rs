//! Telegram bot handler tree configuration
//!
//! The same tree serves the webhook in production and the integration tests,
//! which inject a fake [`ChatApi`](crate::telegram::api::ChatApi).

mod schema;
mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError, SharedApi};
