//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod recorder;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use recorder::{ApiCall, BOT_USERNAME, FIRST_MESSAGE_ID, RecordingApi};
