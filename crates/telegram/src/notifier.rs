use std::sync::Arc;

use altawater_delivery::{AcknowledgeAction, ChatId, MessageRef, Notifier};
use anyhow::Context;
use async_trait::async_trait;

use crate::client::BotClient;
use crate::keyboard;

/// Sends outbound plans through the Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Arc<BotClient>,
}

impl TelegramNotifier {
    pub fn new(client: Arc<BotClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn reply(&self, origin: &ChatId, text: &str) -> anyhow::Result<()> {
        self.client
            .send_message(origin, text, None)
            .await
            .with_context(|| format!("failed to reply in chat {origin}"))?;
        Ok(())
    }

    async fn send_notification(
        &self,
        target: &ChatId,
        text: &str,
        action: Option<&AcknowledgeAction>,
    ) -> anyhow::Result<()> {
        let markup = action.map(keyboard::acknowledge_markup);
        self.client
            .send_message(target, text, markup.as_ref())
            .await
            .with_context(|| format!("failed to notify delivery group {target}"))?;
        Ok(())
    }

    async fn update_notification(&self, message: &MessageRef, text: &str) -> anyhow::Result<()> {
        self.client
            .edit_message_text(message, text)
            .await
            .with_context(|| {
                format!(
                    "failed to update message {} in chat {}",
                    message.message, message.chat
                )
            })
    }
}
