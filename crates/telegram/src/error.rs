//! Error types for the Telegram transport.

use thiserror::Error;

pub type TelegramResult<T> = Result<T, TelegramError>;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("missing bot token")]
    MissingToken,

    #[error("bot api http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid bot api response: {0}")]
    Response(#[from] serde_json::Error),

    #[error("bot api method {method} failed ({code}): {description}")]
    Api {
        method: &'static str,
        code: i64,
        description: String,
    },

    #[error("message reference {0:?} is not a telegram message id")]
    InvalidMessageRef(String),
}
