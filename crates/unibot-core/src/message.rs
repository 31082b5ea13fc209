use serde::{Deserialize, Serialize};

use crate::{Button, Content, MessageComponent, UnibotError, UnibotResult};

/// Canonical outbound message: optional content plus an ordered list of
/// components.
///
/// A message with neither is allowed by the model; renderers decide what to
/// do with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Primary payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Interactive components, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<MessageComponent>,
}

impl Message {
    /// A text-only message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Some(Content::text(text)),
            components: Vec::new(),
        }
    }

    /// A message carrying `content` and no components.
    pub fn with_content(content: Content) -> Self {
        Self {
            content: Some(content),
            components: Vec::new(),
        }
    }

    /// Appends a button.
    pub fn button(mut self, button: Button) -> Self {
        self.components.push(MessageComponent::Button(button));
        self
    }

    /// Appends several buttons, keeping their order.
    pub fn buttons(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.components
            .extend(buttons.into_iter().map(MessageComponent::Button));
        self
    }

    /// Whether the message has neither content nor components.
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.components.is_empty()
    }
}

/// A button in the legacy flat message shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyButton {
    /// Callback payload.
    pub id: String,
    /// Displayed text.
    pub label: String,
}

/// Legacy flat outbound message shape, kept so older handler code keeps
/// working. Convert with `Message::from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    /// Text only.
    Text {
        /// The text.
        text: String,
    },
    /// Image with optional caption.
    Image {
        /// Image URL.
        url: String,
        /// Caption.
        #[serde(default)]
        caption: Option<String>,
    },
    /// Text followed by a list of callback buttons.
    Buttons {
        /// Prompt text; empty means no content.
        #[serde(default)]
        text: String,
        /// Buttons in display order.
        buttons: Vec<LegacyButton>,
    },
}

impl OutgoingMessage {
    /// Parses a legacy message from JSON.
    ///
    /// An unrecognized `type` tag yields [`UnibotError::UnknownVariant`]
    /// rather than a generic JSON error.
    pub fn from_json(value: &serde_json::Value) -> UnibotResult<Self> {
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        match tag {
            "text" | "image" | "buttons" => Ok(serde_json::from_value(value.clone())?),
            other => Err(UnibotError::UnknownVariant(format!(
                "message type '{other}'"
            ))),
        }
    }
}

impl From<OutgoingMessage> for Message {
    fn from(msg: OutgoingMessage) -> Self {
        match msg {
            OutgoingMessage::Text { text } => Message::text(text),
            OutgoingMessage::Image { url, caption } => {
                Message::with_content(Content::Image { url, caption })
            }
            OutgoingMessage::Buttons { text, buttons } => Message {
                content: (!text.is_empty()).then(|| Content::text(text)),
                components: buttons
                    .into_iter()
                    .map(|b| MessageComponent::Button(Button::new(b.id, b.label)))
                    .collect(),
            },
        }
    }
}
