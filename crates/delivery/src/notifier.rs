//! Port the transport implements to carry outbound plans.

use async_trait::async_trait;
use tracing::warn;

use crate::types::{AcknowledgeAction, ChatId, MessageRef, Outbound};

/// Best-effort delivery of outbound messages.
///
/// Failures are reported to the caller of [`deliver`], which logs them; the
/// state transition that produced the plan is never rolled back.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` to the chat the trigger came from.
    async fn reply(&self, origin: &ChatId, text: &str) -> anyhow::Result<()>;

    async fn send_notification(
        &self,
        target: &ChatId,
        text: &str,
        action: Option<&AcknowledgeAction>,
    ) -> anyhow::Result<()>;

    async fn update_notification(&self, message: &MessageRef, text: &str) -> anyhow::Result<()>;
}

/// Carry out `plan` in order. Returns how many instructions were delivered.
pub async fn deliver(notifier: &dyn Notifier, origin: &ChatId, plan: Vec<Outbound>) -> usize {
    let mut delivered = 0;
    for outbound in plan {
        let result = match &outbound {
            Outbound::Reply { text } => notifier.reply(origin, text).await,
            Outbound::Notify {
                target,
                text,
                action,
            } => notifier.send_notification(target, text, action.as_ref()).await,
            Outbound::Update { message, text } => notifier.update_notification(message, text).await,
        };

        match result {
            Ok(()) => delivered += 1,
            Err(error) => warn!(%origin, error = %format!("{error:#}"), "outbound delivery failed"),
        }
    }
    delivered
}
