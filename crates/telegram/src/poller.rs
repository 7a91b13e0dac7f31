//! Long-polling loop and per-update handling.
//!
//! Updates change delivery state strictly in the order Telegram returns them.
//! Only the sending that follows runs concurrently, queued per chat so one
//! chat never sees its replies reordered.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use altawater_config::TelegramConfig;
use altawater_delivery::{deliver, ChatId, Coordinator, Notifier, Outbound};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::client::BotClient;
use crate::dispatch::{Dispatcher, Inbound};
use crate::types::Update;

/// An update already applied to the coordinator; only sending remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planned {
    pub update_id: i64,
    pub origin: Option<ChatId>,
    pub callback: Option<String>,
    pub plan: Vec<Outbound>,
}

/// Runs one update through dispatch, the coordinator and the notifier.
#[derive(Clone)]
pub struct UpdateHandler {
    client: Arc<BotClient>,
    coordinator: Arc<Coordinator>,
    dispatcher: Arc<Dispatcher>,
    notifier: Arc<dyn Notifier>,
}

impl UpdateHandler {
    pub fn new(
        client: Arc<BotClient>,
        coordinator: Arc<Coordinator>,
        dispatcher: Dispatcher,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            coordinator,
            dispatcher: Arc::new(dispatcher),
            notifier,
        }
    }

    pub async fn handle(&self, update: Update) {
        let planned = self.plan(&update);
        self.send(planned).await;
    }

    /// Route `update` and apply it to the coordinator without any network I/O.
    pub fn plan(&self, update: &Update) -> Planned {
        let update_id = update.update_id;
        match self.dispatcher.route(update) {
            Inbound::Trigger {
                origin,
                trigger,
                callback,
            } => Planned {
                update_id,
                origin: Some(origin),
                callback,
                plan: self.coordinator.handle(trigger),
            },
            Inbound::Reply { origin, text } => Planned {
                update_id,
                origin: Some(origin),
                callback: None,
                plan: vec![Outbound::reply(text)],
            },
            Inbound::Ignored { callback } => Planned {
                update_id,
                origin: None,
                callback,
                plan: Vec::new(),
            },
        }
    }

    pub async fn send(&self, planned: Planned) {
        let Planned {
            update_id,
            origin,
            callback,
            plan,
        } = planned;

        self.answer(callback.as_deref()).await;

        match origin {
            Some(origin) => {
                let planned = plan.len();
                let delivered = deliver(self.notifier.as_ref(), &origin, plan).await;
                debug!(update_id, planned, delivered, "update handled");
            }
            None => debug!(update_id, "update ignored"),
        }
    }

    // Stops the client-side spinner on the pressed button.
    async fn answer(&self, callback: Option<&str>) {
        let Some(id) = callback else {
            return;
        };
        if let Err(error) = self.client.answer_callback_query(id).await {
            warn!(%error, "failed to answer callback query");
        }
    }
}

/// Fetches updates, applies them in order and sends the results per chat.
pub struct Poller {
    client: Arc<BotClient>,
    handler: UpdateHandler,
    poll_timeout_seconds: u64,
    retry_delay: Duration,
}

/// Sending tasks still running, chained per originating chat.
#[derive(Default)]
struct Outgoing {
    lanes: HashMap<ChatId, JoinHandle<()>>,
    detached: JoinSet<()>,
}

impl Outgoing {
    fn push(&mut self, handler: &UpdateHandler, planned: Planned) {
        let handler = handler.clone();
        let Some(chat) = planned.origin.clone() else {
            self.detached.spawn(async move { handler.send(planned).await });
            return;
        };

        let previous = self.lanes.remove(&chat);
        let task = tokio::spawn(async move {
            if let Some(previous) = previous {
                log_failure(previous.await);
            }
            handler.send(planned).await;
        });
        self.lanes.insert(chat, task);
    }

    async fn reap(&mut self) {
        let finished: Vec<ChatId> = self
            .lanes
            .iter()
            .filter(|(_, task)| task.is_finished())
            .map(|(chat, _)| chat.clone())
            .collect();
        for chat in finished {
            if let Some(task) = self.lanes.remove(&chat) {
                log_failure(task.await);
            }
        }
        while let Some(finished) = self.detached.try_join_next() {
            log_failure(finished);
        }
    }

    fn len(&self) -> usize {
        self.lanes.len() + self.detached.len()
    }

    async fn drain(mut self) {
        for (_, task) in self.lanes.drain() {
            log_failure(task.await);
        }
        while let Some(finished) = self.detached.join_next().await {
            log_failure(finished);
        }
    }
}

fn log_failure(result: Result<(), tokio::task::JoinError>) {
    if let Err(error) = result {
        warn!(%error, "update task failed");
    }
}

impl Poller {
    pub fn new(client: Arc<BotClient>, handler: UpdateHandler, config: &TelegramConfig) -> Self {
        Self {
            client,
            handler,
            poll_timeout_seconds: config.poll_timeout_seconds,
            retry_delay: Duration::from_millis(config.poll_retry_delay_ms),
        }
    }

    /// Poll until `shutdown` resolves, then wait for in-flight sends.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;
        let mut outgoing = Outgoing::default();

        info!(timeout = self.poll_timeout_seconds, "polling for updates");

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.client.get_updates(offset, self.poll_timeout_seconds) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let planned = self.handler.plan(&update);
                        outgoing.push(&self.handler, planned);
                    }
                }
                Err(error) => {
                    warn!(%error, retry_ms = self.retry_delay.as_millis() as u64, "polling failed");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }

            outgoing.reap().await;
        }

        info!(pending = outgoing.len(), "polling stopped, draining updates");
        outgoing.drain().await;
    }
}
