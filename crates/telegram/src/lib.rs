//! # Altawater Telegram Crate
//!
//! Connects the delivery core to the Telegram Bot API: a small JSON client,
//! the dispatcher that recognises commands, button presses and the request
//! keyword, the [`Notifier`](altawater_delivery::Notifier) implementation,
//! and the long-polling loop that feeds updates through all of it.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod keyboard;
pub mod notifier;
pub mod poller;
pub mod types;

pub use client::BotClient;
pub use dispatch::{Dispatcher, Inbound};
pub use error::{TelegramError, TelegramResult};
pub use notifier::TelegramNotifier;
pub use poller::{Planned, Poller, UpdateHandler};
pub use types::{CallbackQuery, Chat, Message, Update, User};
