//! Application-facing layer of Unibot.
//!
//! [`Bot`] ties the channel adapters to a single [`Router`](unibot_core::Router);
//! [`webhook_router`] exposes the HTTP endpoints webhook-based channels need.
//!
//! ```no_run
//! use unibot_core::{EventType, Message};
//! use unibot_gateway::{Bot, BotConfig};
//!
//! let bot = Bot::new(BotConfig::default());
//! bot.on(EventType::Message, |ctx| async move {
//!     ctx.reply(Message::text("Hello!")).await
//! });
//! ```

/// The `Bot` facade.
pub mod bot;
/// Axum routes for webhooks and health checks.
pub mod server;

pub use bot::{Bot, BotConfig};
pub use server::{serve, webhook_router};
