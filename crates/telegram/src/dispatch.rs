//! Recognises commands, button presses and the request keyword.
//!
//! This is the only place raw chat text is interpreted. Everything the
//! delivery core needs to act on leaves here as a [`Trigger`].

use altawater_delivery::{ChatId, MessageRef, SessionId, Trigger};
use tracing::debug;

use crate::keyboard;
use crate::types::{CallbackQuery, Message, Update};

pub const GREETING: &str =
    "Hello! I am Altawater Bot. Use /join <flat_number> to register your flat.";
pub const JOIN_USAGE: &str = "Usage: /join <flat_number>";
pub const UNIT_TOO_LONG: &str = "Flat number is too long. Please use a shorter one.";

/// What to do with one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Hand `trigger` to the coordinator; replies go to `origin`.
    Trigger {
        origin: ChatId,
        trigger: Trigger,
        callback: Option<String>,
    },
    /// Answer directly without touching delivery state.
    Reply { origin: ChatId, text: String },
    /// Nothing to do beyond acknowledging a button press, if any.
    Ignored { callback: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    request_keyword: String,
    bot_username: Option<String>,
}

impl Dispatcher {
    pub fn new(request_keyword: impl Into<String>) -> Self {
        Self {
            request_keyword: request_keyword.into().trim().to_lowercase(),
            bot_username: None,
        }
    }

    /// Only accept `/command@name` addressed to this bot.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    pub fn route(&self, update: &Update) -> Inbound {
        if let Some(query) = &update.callback_query {
            return self.route_callback(query);
        }
        match &update.message {
            Some(message) => self.route_message(message),
            None => Inbound::Ignored { callback: None },
        }
    }

    fn route_message(&self, message: &Message) -> Inbound {
        let Some(text) = message.text.as_deref() else {
            return Inbound::Ignored { callback: None };
        };
        let origin = ChatId::new(message.chat.id.to_string());

        // Telegram only treats text as a command when `/` is the first character.
        if text.starts_with('/') {
            return self.route_command(message, origin, text);
        }

        if text.trim().to_lowercase() != self.request_keyword {
            return Inbound::Ignored { callback: None };
        }
        match &message.from {
            Some(user) => Inbound::Trigger {
                origin,
                trigger: Trigger::SubmitRequest {
                    session: SessionId::new(user.id.to_string()),
                },
                callback: None,
            },
            None => Inbound::Ignored { callback: None },
        }
    }

    fn route_command(&self, message: &Message, origin: ChatId, text: &str) -> Inbound {
        let mut parts = text.split_whitespace();
        let Some(head) = parts.next() else {
            return Inbound::Ignored { callback: None };
        };
        let args: Vec<&str> = parts.collect();

        let (command, addressee) = match head.trim_start_matches('/').split_once('@') {
            Some((command, addressee)) => (command, Some(addressee)),
            None => (head.trim_start_matches('/'), None),
        };
        if let (Some(addressee), Some(own)) = (addressee, self.bot_username.as_deref()) {
            if !addressee.eq_ignore_ascii_case(own) {
                debug!(command, addressee, "command addressed to another bot");
                return Inbound::Ignored { callback: None };
            }
        }

        match command {
            "start" => Inbound::Reply {
                origin,
                text: GREETING.to_string(),
            },
            "join" => self.route_join(message, origin, &args),
            "register_delivery_group" => Inbound::Trigger {
                trigger: Trigger::DesignateGroup {
                    group: origin.clone(),
                },
                origin,
                callback: None,
            },
            _ => Inbound::Ignored { callback: None },
        }
    }

    fn route_join(&self, message: &Message, origin: ChatId, args: &[&str]) -> Inbound {
        let [unit] = args else {
            return Inbound::Reply {
                origin,
                text: JOIN_USAGE.to_string(),
            };
        };
        if unit.len() > keyboard::max_unit_len() {
            return Inbound::Reply {
                origin,
                text: UNIT_TOO_LONG.to_string(),
            };
        }
        let Some(user) = &message.from else {
            return Inbound::Ignored { callback: None };
        };
        Inbound::Trigger {
            origin,
            trigger: Trigger::RegisterUnit {
                session: SessionId::new(user.id.to_string()),
                unit: (*unit).to_string(),
            },
            callback: None,
        }
    }

    fn route_callback(&self, query: &CallbackQuery) -> Inbound {
        let callback = Some(query.id.clone());
        let unit = query.data.as_deref().and_then(keyboard::parse_callback_data);

        match (unit, &query.message) {
            (Some(unit), Some(message)) => {
                let origin = ChatId::new(message.chat.id.to_string());
                Inbound::Trigger {
                    trigger: Trigger::Acknowledge {
                        unit: unit.to_string(),
                        message: MessageRef::new(origin.clone(), message.message_id.to_string()),
                    },
                    origin,
                    callback,
                }
            }
            _ => Inbound::Ignored { callback },
        }
    }
}
