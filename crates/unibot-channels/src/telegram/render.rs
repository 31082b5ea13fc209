//! Telegram Bot API payloads for `sendMessage` / `sendPhoto`.

use serde::{Deserialize, Serialize};
use unibot_core::render::{check_image, check_text, collect_buttons, paginate};
use unibot_core::{
    Channel, ChannelCapabilities, Content, Message, MessageComponent, Renderer, UnibotResult,
    TELEGRAM_CAPABILITIES,
};

/// Keyboard width used unless configured otherwise. Telegram accepts up to 8
/// buttons per row, but two columns stay readable on phones.
pub const DEFAULT_BUTTONS_PER_ROW: usize = 2;

/// Content fields of a Telegram send request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramContent {
    /// `sendMessage` text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `sendPhoto` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Photo caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// A callback button in an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Label shown on the button.
    pub text: String,
    /// Sent back in the `callback_query` when pressed.
    pub callback_data: String,
}

/// `reply_markup` holding rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    /// Rows, top to bottom.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// Full Telegram send payload, minus `chat_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramPayload {
    /// Text or photo fields.
    #[serde(flatten)]
    pub content: TelegramContent,
    /// Inline keyboard, if the message has buttons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl TelegramPayload {
    /// Bot API method that delivers this payload.
    pub fn method(&self) -> &'static str {
        if self.content.photo.is_some() {
            "sendPhoto"
        } else {
            "sendMessage"
        }
    }
}

/// Renders messages into inline-keyboard payloads.
#[derive(Debug, Clone)]
pub struct TelegramRenderer {
    buttons_per_row: usize,
}

impl Default for TelegramRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelegramRenderer {
    /// Creates a renderer with [`DEFAULT_BUTTONS_PER_ROW`] columns.
    pub fn new() -> Self {
        Self {
            buttons_per_row: DEFAULT_BUTTONS_PER_ROW.min(TELEGRAM_CAPABILITIES.button.max_buttons_per_row),
        }
    }

    /// Uses `per_row` buttons per keyboard row, clamped to `1..=8`.
    pub fn with_buttons_per_row(per_row: usize) -> Self {
        Self {
            buttons_per_row: per_row.clamp(1, TELEGRAM_CAPABILITIES.button.max_buttons_per_row),
        }
    }
}

impl Renderer for TelegramRenderer {
    type Content = TelegramContent;
    type Components = InlineKeyboardMarkup;
    type Payload = TelegramPayload;

    fn channel(&self) -> Channel {
        Channel::Telegram
    }

    fn capabilities(&self) -> &ChannelCapabilities {
        &TELEGRAM_CAPABILITIES
    }

    fn buttons_per_row(&self) -> usize {
        self.buttons_per_row
    }

    fn render_content(&self, content: &Content) -> UnibotResult<TelegramContent> {
        match content {
            Content::Text { text } => {
                check_text(self.channel(), self.capabilities(), text)?;
                Ok(TelegramContent {
                    text: Some(text.clone()),
                    ..Default::default()
                })
            }
            Content::Image { url, caption } => {
                check_image(self.channel(), self.capabilities(), caption.as_deref())?;
                Ok(TelegramContent {
                    photo: Some(url.clone()),
                    caption: caption.clone(),
                    ..Default::default()
                })
            }
        }
    }

    fn render_components(
        &self,
        components: &[MessageComponent],
    ) -> UnibotResult<Option<InlineKeyboardMarkup>> {
        let buttons = collect_buttons(self.channel(), self.capabilities(), components)?;
        if buttons.is_empty() {
            return Ok(None);
        }

        let inline_keyboard = paginate(&buttons, self.buttons_per_row)
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|button| InlineKeyboardButton {
                        text: button.label.clone(),
                        callback_data: button.id.clone(),
                    })
                    .collect()
            })
            .collect();

        Ok(Some(InlineKeyboardMarkup { inline_keyboard }))
    }

    fn render(&self, message: &Message) -> UnibotResult<TelegramPayload> {
        let content = match &message.content {
            Some(content) => self.render_content(content)?,
            None => TelegramContent::default(),
        };
        let reply_markup = self.render_components(&message.components)?;
        Ok(TelegramPayload {
            content,
            reply_markup,
        })
    }
}
