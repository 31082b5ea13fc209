//! Channel-abstraction core for Unibot.
//!
//! This crate holds everything that is independent of a particular chat
//! platform: the inbound event model, the outbound message model, per-channel
//! capability tables, the renderer contract, the adapter contract, and the
//! router that fans events out to user handlers.
//!
//! # Main types
//!
//! - [`IncomingEvent`] — Normalized inbound event (message, button click, reaction, join).
//! - [`Message`] — Channel-neutral outbound message: [`Content`] plus [`MessageComponent`]s.
//! - [`ChannelCapabilities`] — Static per-channel limits.
//! - [`Renderer`] — Validates a [`Message`] and serializes it for one channel.
//! - [`Adapter`] — Contract every channel integration satisfies.
//! - [`Router`] — Event type → handlers registry and dispatcher.
//! - [`Context`] — Per-event facade with a bound `reply`.
//! - [`UnibotError`] — Unified error enum.

/// Adapter contract and reply addressing.
pub mod adapter;
/// Per-channel capability tables.
pub mod capabilities;
/// The `Channel` enumeration.
pub mod channel;
/// Interactive message components.
pub mod component;
/// Message content variants.
pub mod content;
/// Per-event handler facade.
pub mod context;
/// Error types.
pub mod error;
/// Inbound event model.
pub mod event;
/// Outbound message model and legacy conversion.
pub mod message;
/// Renderer contract and shared validation.
pub mod render;
/// Event router.
pub mod router;

pub use adapter::{Adapter, CoreEventHandler, Destination, HandlerSlot};
pub use capabilities::{
    capabilities, ButtonCapabilities, ChannelCapabilities, ContentCapabilities, LengthUnit,
    DISCORD_CAPABILITIES, TELEGRAM_CAPABILITIES,
};
pub use channel::Channel;
pub use component::{Button, ButtonStyle, MessageComponent};
pub use content::{Content, ContentKind};
pub use context::Context;
pub use error::{UnibotError, UnibotResult};
pub use event::{EventType, IncomingEvent};
pub use message::{LegacyButton, Message, OutgoingMessage};
pub use render::{paginate, Renderer};
pub use router::{EventHandler, Router};
