use std::sync::Arc;

use crate::{Adapter, Channel, Destination, EventType, IncomingEvent, Message, UnibotResult};

/// Per-event facade handed to handlers.
///
/// Gives read access to the event and a [`reply`](Context::reply) bound to
/// the user and chat that produced it. Cloning is cheap; every handler of an
/// event receives a clone of the same context.
#[derive(Clone)]
pub struct Context {
    event: Arc<IncomingEvent>,
    adapter: Arc<dyn Adapter>,
}

impl Context {
    /// Wraps `event`; replies go out through `adapter`.
    pub fn new(event: IncomingEvent, adapter: Arc<dyn Adapter>) -> Self {
        Self {
            event: Arc::new(event),
            adapter,
        }
    }

    /// Channel the event came from.
    pub fn channel(&self) -> Channel {
        self.event.channel
    }

    /// Kind of event.
    pub fn event_type(&self) -> EventType {
        self.event.event_type
    }

    /// Platform id of the user who triggered the event.
    pub fn user_id(&self) -> &str {
        &self.event.external_user_id
    }

    /// Platform chat or channel id, when there is one.
    pub fn chat_id(&self) -> Option<&str> {
        self.event.external_chat_id.as_deref()
    }

    /// Message text, or the button id for clicks.
    pub fn text(&self) -> Option<&str> {
        self.event.text.as_deref()
    }

    /// Id of the message the event refers to.
    pub fn message_id(&self) -> Option<&str> {
        self.event.message_id.as_deref()
    }

    /// Reaction emoji.
    pub fn reaction(&self) -> Option<&str> {
        self.event.reaction.as_deref()
    }

    /// User who joined, for join events.
    pub fn joined_user_id(&self) -> Option<&str> {
        self.event.joined_user_id.as_deref()
    }

    /// Original platform payload.
    pub fn raw(&self) -> &serde_json::Value {
        &self.event.raw
    }

    /// The whole normalized event.
    pub fn event(&self) -> &IncomingEvent {
        &self.event
    }

    /// Address replies from this context go to.
    pub fn destination(&self) -> Destination {
        Destination {
            channel: self.event.channel,
            external_user_id: self.event.external_user_id.clone(),
            external_chat_id: self.event.external_chat_id.clone(),
        }
    }

    /// Sends `message` back to the originating user/chat.
    pub async fn reply(&self, message: impl Into<Message>) -> UnibotResult<()> {
        let message = message.into();
        self.adapter.send(&message, &self.destination()).await
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("event", &self.event)
            .field("adapter", &self.adapter.name())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::CoreEventHandler;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingAdapter {
        sent: Mutex<Vec<(Message, Destination)>>,
    }

    #[async_trait]
    impl Adapter for RecordingAdapter {
        fn name(&self) -> Channel {
            Channel::Telegram
        }

        fn attach_core(&self, _handler: CoreEventHandler) {}

        async fn send(&self, message: &Message, destination: &Destination) -> UnibotResult<()> {
            self.sent.lock().push((message.clone(), destination.clone()));
            Ok(())
        }
    }

    fn event() -> IncomingEvent {
        IncomingEvent::new(
            Channel::Telegram,
            EventType::Message,
            "123",
            serde_json::json!({"update_id": 1}),
        )
        .with_chat_id("456")
        .with_text(Some("hello".into()))
    }

    #[test]
    fn test_accessors() {
        let ctx = Context::new(event(), Arc::new(RecordingAdapter::default()));
        assert_eq!(ctx.channel(), Channel::Telegram);
        assert_eq!(ctx.user_id(), "123");
        assert_eq!(ctx.chat_id(), Some("456"));
        assert_eq!(ctx.text(), Some("hello"));
        assert_eq!(ctx.raw()["update_id"], 1);
        assert!(ctx.reaction().is_none());
    }

    #[tokio::test]
    async fn test_reply_is_addressed_to_origin() {
        let adapter = Arc::new(RecordingAdapter::default());
        let ctx = Context::new(event(), adapter.clone());

        ctx.reply(Message::text("hi back")).await.unwrap();

        let sent = adapter.sent.lock();
        assert_eq!(sent.len(), 1);
        let (message, dest) = &sent[0];
        assert_eq!(message, &Message::text("hi back"));
        assert_eq!(dest.channel, Channel::Telegram);
        assert_eq!(dest.external_user_id, "123");
        assert_eq!(dest.external_chat_id.as_deref(), Some("456"));
    }
}
