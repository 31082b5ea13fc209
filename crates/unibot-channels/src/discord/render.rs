//! Discord `POST /channels/{id}/messages` payloads.

use serde::{Deserialize, Serialize};
use unibot_core::render::{check_image, check_text, collect_buttons, paginate};
use unibot_core::{
    Button, ButtonStyle, Channel, ChannelCapabilities, Content, Message, MessageComponent,
    Renderer, UnibotResult, DISCORD_CAPABILITIES,
};

const ACTION_ROW: u8 = 1;
const BUTTON: u8 = 2;

/// `embed.image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedImage {
    /// Image URL.
    pub url: String,
}

/// A rich embed. Images are sent this way; the caption becomes the
/// description, which Discord allows up to 4096 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Caption text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The image itself.
    pub image: EmbedImage,
}

/// Content fields of a Discord message create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordContent {
    /// Plain message text, at most 2000 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Embeds; at most one, carrying an image.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

/// A button component (type 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordButton {
    /// Component type, always `2`.
    #[serde(rename = "type")]
    pub kind: u8,
    /// See [`style_code`].
    pub style: u8,
    /// Visible label.
    pub label: String,
    /// Set for every style except link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    /// Set only for link buttons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An action row (type 1) holding up to five buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRow {
    /// Component type, always `1`.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Buttons in this row.
    pub components: Vec<DiscordButton>,
}

/// Full Discord message payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordPayload {
    /// Text and embeds.
    #[serde(flatten)]
    pub content: DiscordContent,
    /// Button rows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ActionRow>,
}

/// Discord's numeric button style.
pub fn style_code(style: ButtonStyle) -> u8 {
    match style {
        ButtonStyle::Primary => 1,
        ButtonStyle::Secondary => 2,
        ButtonStyle::Success => 3,
        ButtonStyle::Danger => 4,
        ButtonStyle::Link => 5,
    }
}

fn discord_button(button: &Button) -> DiscordButton {
    let style = button.style.unwrap_or_default();
    let (custom_id, url) = if button.is_link() {
        (None, button.url.clone())
    } else {
        (Some(button.id.clone()), None)
    };
    DiscordButton {
        kind: BUTTON,
        style: style_code(style),
        label: button.label.clone(),
        custom_id,
        url,
    }
}

/// Renders messages into action rows of up to five buttons.
#[derive(Debug, Clone, Default)]
pub struct DiscordRenderer;

impl DiscordRenderer {
    /// Creates a renderer.
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DiscordRenderer {
    type Content = DiscordContent;
    type Components = Vec<ActionRow>;
    type Payload = DiscordPayload;

    fn channel(&self) -> Channel {
        Channel::Discord
    }

    fn capabilities(&self) -> &ChannelCapabilities {
        &DISCORD_CAPABILITIES
    }

    fn render_content(&self, content: &Content) -> UnibotResult<DiscordContent> {
        match content {
            Content::Text { text } => {
                check_text(self.channel(), self.capabilities(), text)?;
                Ok(DiscordContent {
                    content: Some(text.clone()),
                    embeds: Vec::new(),
                })
            }
            Content::Image { url, caption } => {
                check_image(self.channel(), self.capabilities(), caption.as_deref())?;
                Ok(DiscordContent {
                    content: None,
                    embeds: vec![Embed {
                        description: caption.clone(),
                        image: EmbedImage { url: url.clone() },
                    }],
                })
            }
        }
    }

    fn render_components(
        &self,
        components: &[MessageComponent],
    ) -> UnibotResult<Option<Vec<ActionRow>>> {
        let buttons = collect_buttons(self.channel(), self.capabilities(), components)?;
        if buttons.is_empty() {
            return Ok(None);
        }

        let rows = paginate(&buttons, self.buttons_per_row())
            .into_iter()
            .map(|row| ActionRow {
                kind: ACTION_ROW,
                components: row.iter().map(|button| discord_button(button)).collect(),
            })
            .collect();

        Ok(Some(rows))
    }

    fn render(&self, message: &Message) -> UnibotResult<DiscordPayload> {
        let content = match &message.content {
            Some(content) => self.render_content(content)?,
            None => DiscordContent::default(),
        };
        let components = self.render_components(&message.components)?.unwrap_or_default();
        Ok(DiscordPayload {
            content,
            components,
        })
    }
}
