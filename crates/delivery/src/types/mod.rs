//! Shared types for the delivery core.
//!
//! Identifiers are opaque tokens handed over by the transport. The core only
//! compares them; it never looks inside.

pub mod errors;
pub mod triggers;

pub use errors::{DeliveryError, DeliveryResult};
pub use triggers::{AcknowledgeAction, Outbound, Trigger};

use std::fmt;

/// One chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A conversation that can receive messages: a private chat or a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The delivery group is an ordinary chat designated as notification target.
pub type GroupId = ChatId;

/// Reference to a message already sent, so it can be edited later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message: String,
}

impl MessageRef {
    pub fn new(chat: ChatId, message: impl Into<String>) -> Self {
        Self {
            chat,
            message: message.into(),
        }
    }
}

/// Flat or apartment identifier as typed by the resident.
///
/// Surrounding whitespace is dropped and an empty identifier is rejected;
/// nothing else about the format is checked.
///
/// ```
/// use altawater_delivery::UnitId;
///
/// assert_eq!(UnitId::parse(" 12B ").unwrap().as_str(), "12B");
/// assert!(UnitId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(String);

impl UnitId {
    pub fn parse(raw: &str) -> DeliveryResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DeliveryError::InvalidUnit);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
