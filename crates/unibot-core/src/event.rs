use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Channel;

/// Kind of inbound occurrence an [`IncomingEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A user sent a message.
    Message,
    /// A user pressed an interactive button.
    ButtonClick,
    /// A user reacted to a message.
    Reaction,
    /// A user joined a chat or guild.
    Join,
}

impl EventType {
    /// Wire name of the event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Message => "message",
            EventType::ButtonClick => "button_click",
            EventType::Reaction => "reaction",
            EventType::Join => "join",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, channel-neutral representation of something that happened on a
/// channel.
///
/// Only `external_user_id` is guaranteed; the remaining fields depend on
/// [`EventType`]. `raw` keeps the platform payload the event was normalized
/// from and is never interpreted outside the owning channel's normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingEvent {
    /// Channel the event arrived on.
    pub channel: Channel,
    /// What happened.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Platform id of the acting user.
    pub external_user_id: String,
    /// Platform id of the chat, channel or guild, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_chat_id: Option<String>,
    /// Message text or button payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Platform id of the message the event refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Emoji of a reaction event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    /// Platform id of the user who joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_user_id: Option<String>,
    /// Original platform payload.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl IncomingEvent {
    /// Creates an event with only the mandatory fields set.
    pub fn new(
        channel: Channel,
        event_type: EventType,
        external_user_id: impl Into<String>,
        raw: serde_json::Value,
    ) -> Self {
        Self {
            channel,
            event_type,
            external_user_id: external_user_id.into(),
            external_chat_id: None,
            text: None,
            message_id: None,
            reaction: None,
            joined_user_id: None,
            raw,
        }
    }

    /// Sets the chat id.
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.external_chat_id = Some(chat_id.into());
        self
    }

    /// Sets the text, leaving it unset when `text` is `None`.
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text;
        self
    }

    /// Sets the referenced message id.
    pub fn with_message_id(mut self, message_id: Option<String>) -> Self {
        self.message_id = message_id;
        self
    }

    /// Sets the reaction emoji.
    pub fn with_reaction(mut self, reaction: impl Into<String>) -> Self {
        self.reaction = Some(reaction.into());
        self
    }

    /// Sets the joined user id.
    pub fn with_joined_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.joined_user_id = Some(user_id.into());
        self
    }
}
