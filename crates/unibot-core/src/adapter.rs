//! The contract every channel integration implements.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{Channel, IncomingEvent, Message, UnibotResult};

/// Where a reply should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Channel to send on.
    pub channel: Channel,
    /// Recipient user; used when there is no chat id.
    pub external_user_id: String,
    /// Chat or channel to post in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_chat_id: Option<String>,
}

impl Destination {
    /// The chat to post into, falling back to the user for direct messages.
    pub fn target_id(&self) -> &str {
        self.external_chat_id
            .as_deref()
            .unwrap_or(&self.external_user_id)
    }
}

/// Function an adapter calls for every normalized inbound event.
pub type CoreEventHandler =
    Arc<dyn Fn(IncomingEvent) -> BoxFuture<'static, UnibotResult<()>> + Send + Sync>;

/// A channel integration.
///
/// Transport details (webhooks, sockets, HTTP calls, retries) are entirely
/// the adapter's business.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Channel this adapter serves.
    fn name(&self) -> Channel;

    /// Registers the core dispatch function. Only one handler is active;
    /// attaching again replaces the previous one.
    fn attach_core(&self, handler: CoreEventHandler);

    /// Starts background ingestion for channels that keep a connection open.
    async fn start(&self) -> UnibotResult<()> {
        Ok(())
    }

    /// Renders and delivers `message`.
    async fn send(&self, message: &Message, destination: &Destination) -> UnibotResult<()>;
}

/// Single-slot, last-writer-wins holder for an adapter's [`CoreEventHandler`].
#[derive(Default)]
pub struct HandlerSlot {
    inner: RwLock<Option<CoreEventHandler>>,
}

impl HandlerSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current handler.
    pub fn set(&self, handler: CoreEventHandler) {
        *self.inner.write() = Some(handler);
    }

    /// The current handler, if any.
    pub fn get(&self) -> Option<CoreEventHandler> {
        self.inner.read().clone()
    }

    /// Whether a handler has been attached.
    pub fn is_attached(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl std::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}
