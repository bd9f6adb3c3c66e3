//! Telegram bot integration: Bot API seam, flows and the handler tree

pub mod admin;
pub mod api;
pub mod bot;
pub mod context;
pub mod handlers;
pub mod keyboards;
pub mod markdown;
pub mod onboarding;
pub mod payment;
pub mod poll;

// Re-exports for convenience
pub use api::ChatApi;
pub use bot::{create_bot, setup_bot_commands, Command};
pub use context::{ButtonPress, FlowContext};
pub use handlers::{schema, HandlerDeps, HandlerError, SharedApi};
pub use teloxide::Bot;
