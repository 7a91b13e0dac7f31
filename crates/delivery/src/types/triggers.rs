//! Inbound triggers and outbound instructions.

use super::{ChatId, MessageRef, SessionId, UnitId};

/// One inbound event, already recognised by the dispatch layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A resident registers the flat they live in.
    RegisterUnit { session: SessionId, unit: String },
    /// A resident asks for a delivery to their registered flat.
    SubmitRequest { session: SessionId },
    /// A team member pressed the acknowledge action on a notification.
    Acknowledge { unit: String, message: MessageRef },
    /// A group chat asks to receive delivery notifications.
    DesignateGroup { group: ChatId },
}

/// Action attached to a group notification so the team can mark it done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcknowledgeAction {
    pub unit: UnitId,
}

/// What the core wants sent. Replies go back to the chat the trigger came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Reply {
        text: String,
    },
    Notify {
        target: ChatId,
        text: String,
        action: Option<AcknowledgeAction>,
    },
    Update {
        message: MessageRef,
        text: String,
    },
}

impl Outbound {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply { text: text.into() }
    }

    pub fn update(message: MessageRef, text: impl Into<String>) -> Self {
        Self::Update {
            message,
            text: text.into(),
        }
    }
}
