//! Routie bot - Telegram webhook service for the Routie waitlist
//!
//! Onboards users with `/start`, runs the "apply for beta" poll, sells capped
//! early bird seats through Telegram Stars invoices and reports admin stats.
//!
//! # Module Structure
//!
//! - `core`: configuration, static content, errors, logging and the webhook server
//! - `storage`: the key-value store (Redis or in-memory)
//! - `telegram`: Bot API seam, conversational flows and the handler tree
//! - `cli`: command line interface of the binary

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use self::core::{config, AppError, AppResult, Config};
pub use storage::{MemoryStore, RedisStore, Store};
