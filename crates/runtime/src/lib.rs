use std::sync::Arc;

use altawater_config::AppConfig;
use altawater_delivery::{Coordinator, Notifier};
use altawater_telegram::{BotClient, Dispatcher, Poller, TelegramError, TelegramNotifier, UpdateHandler};
use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything the poll loop and the keep-alive listener share.
#[derive(Clone)]
pub struct BotServices {
    pub coordinator: Arc<Coordinator>,
    pub client: Arc<BotClient>,
    pub notifier: Arc<dyn Notifier>,
    pub dispatcher: Dispatcher,
    bot_username: Option<String>,
}

impl BotServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let client = match BotClient::new(&config.telegram) {
            Ok(client) => Arc::new(client),
            Err(TelegramError::MissingToken) => {
                anyhow::bail!("BOT_TOKEN is not set; configure telegram.bot_token or export BOT_TOKEN")
            }
            Err(error) => return Err(error).context("failed to build bot api client"),
        };

        // Without the username, commands addressed to other bots are accepted too.
        let bot_username = match client.get_me().await {
            Ok(me) => {
                info!(username = ?me.username, id = me.id, "bot identity resolved");
                me.username
            }
            Err(error) => {
                warn!(%error, "failed to resolve bot identity, proceeding without it");
                None
            }
        };

        let mut dispatcher = Dispatcher::new(config.delivery.request_keyword.clone());
        if let Some(username) = &bot_username {
            dispatcher = dispatcher.with_bot_username(username.clone());
        }

        let coordinator = Arc::new(Coordinator::with_request_keyword(
            config.delivery.request_keyword.clone(),
        ));
        let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(client.clone()));

        info!(keyword = %config.delivery.request_keyword, "delivery coordinator ready");

        Ok(Self {
            coordinator,
            client,
            notifier,
            dispatcher,
            bot_username,
        })
    }

    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.as_deref()
    }

    pub fn poller(&self, config: &AppConfig) -> Poller {
        let handler = UpdateHandler::new(
            self.client.clone(),
            self.coordinator.clone(),
            self.dispatcher.clone(),
            self.notifier.clone(),
        );
        Poller::new(self.client.clone(), handler, &config.telegram)
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

/// A shutdown notification that several tasks can wait on.
#[derive(Clone)]
pub struct Shutdown {
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    /// Fires once Ctrl-C is received.
    pub fn on_signal() -> Self {
        let (trigger, shutdown) = Self::channel();
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = trigger.send(true);
        });
        shutdown
    }

    /// Fires when `true` is sent or the sender is dropped.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (sender, receiver) = watch::channel(false);
        (sender, Self { receiver })
    }

    pub async fn wait(mut self) {
        // A closed channel counts as shutdown.
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }
}
