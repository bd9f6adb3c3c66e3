//! Process configuration
//!
//! Everything is read once at startup (after `dotenvy` has loaded `.env`) into
//! an immutable [`Config`] that is shared through `Arc` with the web server and
//! the handlers. Static values that never come from the environment live in
//! the small submodules below.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use strum::{AsRefStr, Display, EnumString};
use url::Url;

use crate::core::error::{AppError, AppResult};

/// Deployment environment; selects the Redis key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Environment {
    #[strum(to_string = "prod", serialize = "production")]
    Production,
    #[strum(to_string = "dev", serialize = "development")]
    Development,
}

impl Environment {
    /// `production`/`prod` (any case) selects production, anything else is development.
    pub fn parse(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(Environment::Development)
    }
}

/// Admin configuration
pub mod admin {
    /// Admins allowed to run `/getStats` when `ADMIN_IDS` is not set
    pub const DEFAULT_ADMIN_IDS: [i64; 2] = [1313487041, 1036753723];

    pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }
}

/// Early bird sales configuration
pub mod early_access {
    /// Seats sold before the offer closes
    pub const MAX_COUNT: u64 = 500;

    /// Telegram Stars
    pub const CURRENCY: &str = "XTR";

    /// Action tag embedded in the invoice payload
    pub const ACTION_TAG: &str = "buyEarlyBirdAccess";
}

/// Webhook endpoint configuration
pub mod webhook {
    pub const PATH: &str = "/api/telegram/webhook";

    /// Header Telegram fills with the secret passed to `setWebhook`
    pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

    pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Welcome animation used in production
pub const DEFAULT_WELCOME_ANIMATION: &str = "CgACAgIAAxkBAAIB7Whbuf3mL8cJlAKxtvHoTsZJJu3AAAIbdgACezTYSqSe-A8sgpU6NgQ";

#[derive(Debug)]
pub struct Config {
    /// `BOT_TOKEN` or `TELOXIDE_TOKEN`; `None` makes the webhook answer 400
    pub bot_token: Option<SecretString>,
    /// `TG_WEBHOOK_SECRET`; `None` makes the webhook answer 401
    pub webhook_secret: Option<SecretString>,
    pub redis_url: Option<String>,
    /// Invoice price in Stars; `None` disables sales
    pub early_bird_price: Option<u32>,
    /// File id of the welcome animation; `None` sends the text welcome
    pub welcome_animation: Option<String>,
    pub environment: Environment,
    pub admin_ids: Vec<i64>,
    pub early_access_max_count: u64,
    pub team_contact_url: Option<Url>,
    pub bind_addr: SocketAddr,
    /// Public URL registered by the `set-webhook` command
    pub webhook_url: Option<Url>,
    /// Custom Bot API server
    pub bot_api_url: Option<Url>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get("BOT_TOKEN").or_else(|| get("TELOXIDE_TOKEN")).map(SecretString::from);
        let webhook_secret = get("TG_WEBHOOK_SECRET").map(SecretString::from);

        let early_bird_price = match get("EARLY_BIRD_ACCESS_PRICE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(price) if price > 0 => Some(price),
                _ => {
                    tracing::warn!(value = %raw, "EARLY_BIRD_ACCESS_PRICE is not a positive integer, sales disabled");
                    None
                }
            },
            None => None,
        };

        // Unset means the production animation; set-but-empty disables it.
        let welcome_animation = match lookup("WELCOME_ANIMATION") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().to_string()),
            None => Some(DEFAULT_WELCOME_ANIMATION.to_string()),
        };

        let admin_ids = match get("ADMIN_IDS") {
            Some(raw) => admin::parse_admin_ids(&raw),
            None => admin::DEFAULT_ADMIN_IDS.to_vec(),
        };

        let early_access_max_count = match get("EARLY_ACCESS_MAX_COUNT") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| AppError::Config(format!("EARLY_ACCESS_MAX_COUNT is not a number: {}", raw)))?,
            None => early_access::MAX_COUNT,
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| webhook::DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("Invalid BIND_ADDR: {}", e)))?;

        Ok(Self {
            bot_token,
            webhook_secret,
            redis_url: get("REDIS_URL"),
            early_bird_price,
            welcome_animation,
            environment: get("APP_ENV")
                .map(|raw| Environment::parse(&raw))
                .unwrap_or(Environment::Development),
            admin_ids,
            early_access_max_count,
            team_contact_url: get("TEAM_CONTACT_URL").map(|raw| Url::parse(&raw)).transpose()?,
            bind_addr,
            webhook_url: get("WEBHOOK_URL").map(|raw| Url::parse(&raw)).transpose()?,
            bot_api_url: get("BOT_API_URL").map(|raw| Url::parse(&raw)).transpose()?,
        })
    }
}
