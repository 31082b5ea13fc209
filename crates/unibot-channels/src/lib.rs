//! Channel integrations for Unibot.
//!
//! Each channel provides three pieces:
//!
//! - a **normalizer** turning platform payloads into [`IncomingEvent`]s,
//! - a **renderer** turning [`Message`]s into the platform's send payload,
//! - an **adapter** owning the transport.
//!
//! | Channel  | Inbound                   | Outbound            |
//! |----------|---------------------------|---------------------|
//! | Telegram | webhook (`handle_update`) | Bot API over HTTPS  |
//! | Discord  | gateway WebSocket         | REST API over HTTPS |
//!
//! [`IncomingEvent`]: unibot_core::IncomingEvent
//! [`Message`]: unibot_core::Message

pub mod discord;
mod json;
pub mod telegram;

pub use discord::{DiscordAdapter, DiscordConfig, DiscordRenderer};
pub use telegram::{TelegramAdapter, TelegramConfig, TelegramRenderer};
