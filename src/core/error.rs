use thiserror::Error;

/// Centralized error types for the application
///
/// Store, Bot API and payload failures are converted to this enum so flows can
/// use `?` and the dispatcher sees one error type.
///
/// # Example
///
/// ```no_run
/// use routie_bot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Redis command or connection errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// JSON encoding/decoding errors (stored records, invoice payloads)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// `REDIS_URL` is not set, so there is no store to talk to
    #[error("Store is not available")]
    StoreUnavailable,

    /// Invoice payload or callback data that does not match the expected format
    #[error("Invalid payload: {0}")]
    Payload(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
