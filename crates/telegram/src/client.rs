use std::time::Duration;

use altawater_config::TelegramConfig;
use altawater_delivery::{ChatId, MessageRef};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{TelegramError, TelegramResult};
use crate::types::{
    AnswerCallbackQuery, ApiResponse, EditMessageText, GetUpdates, InlineKeyboardMarkup, Message,
    SendMessage, Update, User,
};

const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Minimal JSON client for the Telegram Bot API.
///
/// Errors never carry the request URL, since it embeds the bot token.
#[derive(Clone)]
pub struct BotClient {
    http: Client,
    endpoint: String,
}

impl BotClient {
    pub fn new(config: &TelegramConfig) -> TelegramResult<Self> {
        let token = config
            .bot_token
            .as_deref()
            .ok_or(TelegramError::MissingToken)?;
        Self::with_token(
            &config.api_base_url,
            token,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn with_token(base_url: &str, token: &str, timeout: Duration) -> TelegramResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TelegramError::Http(error.without_url()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", base_url.trim_end_matches('/'), token),
        })
    }

    pub async fn get_me(&self) -> TelegramResult<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_seconds`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_seconds: u64,
    ) -> TelegramResult<Vec<Update>> {
        let payload = GetUpdates {
            offset,
            timeout: timeout_seconds,
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &payload).await
    }

    pub async fn send_message(
        &self,
        chat: &ChatId,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> TelegramResult<Message> {
        let payload = SendMessage {
            chat_id: chat_target(chat),
            text,
            reply_markup,
        };
        self.call("sendMessage", &payload).await
    }

    /// Replace the text of a sent message. Its inline keyboard is dropped.
    pub async fn edit_message_text(&self, message: &MessageRef, text: &str) -> TelegramResult<()> {
        let message_id = message
            .message
            .parse::<i64>()
            .map_err(|_| TelegramError::InvalidMessageRef(message.message.clone()))?;
        let payload = EditMessageText {
            chat_id: chat_target(&message.chat),
            message_id,
            text,
        };
        // The result is the edited message or `true`; neither is needed.
        let _: Value = self.call("editMessageText", &payload).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> TelegramResult<()> {
        let payload = AnswerCallbackQuery { callback_query_id };
        let _: bool = self.call("answerCallbackQuery", &payload).await?;
        Ok(())
    }

    async fn call<P, R>(&self, method: &'static str, payload: &P) -> TelegramResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(method, "calling bot api");

        let response = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(payload)
            .send()
            .await
            .map_err(|error| TelegramError::Http(error.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| TelegramError::Http(error.without_url()))?;

        let envelope: ApiResponse<R> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    method,
                    code: i64::from(status.as_u16()),
                    description: status.to_string(),
                })
            }
            Err(error) => return Err(error.into()),
        };

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description,
                error_code,
                ..
            } => Err(TelegramError::Api {
                method,
                code: error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                description: description.unwrap_or_else(|| "no result returned".to_string()),
            }),
        }
    }
}

/// Numeric chat ids go out as numbers, anything else (`@channel`) as a string.
fn chat_target(chat: &ChatId) -> Value {
    chat.as_str()
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(chat.as_str()))
}
