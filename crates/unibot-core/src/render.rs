//! Renderer contract and the validation/pagination shared by every channel.
//!
//! A renderer turns a channel-neutral [`Message`] into the payload the
//! platform API expects. Rendering is pure: it either returns the complete
//! payload or the first validation error, never a partial result.

use serde::Serialize;

use crate::capabilities::ChannelCapabilities;
use crate::{Button, Channel, Content, Message, MessageComponent, UnibotError, UnibotResult};

/// Validates and serializes messages for one channel.
pub trait Renderer: Send + Sync {
    /// Native representation of [`Content`].
    type Content: Serialize;
    /// Native representation of a component list.
    type Components: Serialize;
    /// Full native send payload.
    type Payload: Serialize;

    /// Channel this renderer targets.
    fn channel(&self) -> Channel;

    /// Capability table the renderer validates against.
    fn capabilities(&self) -> &ChannelCapabilities;

    /// Buttons per row actually used when paginating. Defaults to the
    /// platform limit.
    fn buttons_per_row(&self) -> usize {
        self.capabilities().button.max_buttons_per_row
    }

    /// Renders the content portion of a message.
    fn render_content(&self, content: &Content) -> UnibotResult<Self::Content>;

    /// Renders components. Returns `None` when there is nothing to render.
    fn render_components(
        &self,
        components: &[MessageComponent],
    ) -> UnibotResult<Option<Self::Components>>;

    /// Renders a whole message.
    fn render(&self, message: &Message) -> UnibotResult<Self::Payload>;

    /// Renders a whole message into a JSON value.
    fn render_json(&self, message: &Message) -> UnibotResult<serde_json::Value> {
        Ok(serde_json::to_value(self.render(message)?)?)
    }
}

/// Checks a text body against the channel's text limit.
pub fn check_text(channel: Channel, caps: &ChannelCapabilities, text: &str) -> UnibotResult<()> {
    if let Some(limit) = caps.content.max_text_length {
        let actual = caps.content.text_unit.measure(text);
        if actual > limit {
            return Err(UnibotError::ContentTooLong {
                channel,
                limit,
                actual,
            });
        }
    }
    Ok(())
}

/// Checks that the channel takes images and that the caption fits.
pub fn check_image(
    channel: Channel,
    caps: &ChannelCapabilities,
    caption: Option<&str>,
) -> UnibotResult<()> {
    if !caps.content.supports_images {
        return Err(UnibotError::UnsupportedContent {
            channel,
            kind: "image".to_string(),
        });
    }
    if let (Some(caption), Some(limit)) = (caption, caps.content.max_caption_length) {
        let actual = caps.content.text_unit.measure(caption);
        if actual > limit {
            return Err(UnibotError::CaptionTooLong {
                channel,
                limit,
                actual,
            });
        }
    }
    Ok(())
}

/// Checks one button against the channel's button limits and the
/// link ⇔ url invariant.
pub fn check_button(
    channel: Channel,
    caps: &ChannelCapabilities,
    button: &Button,
) -> UnibotResult<()> {
    let limits = &caps.button;

    if limits.button_id_unit.measure(&button.id) > limits.max_button_id_length {
        return Err(UnibotError::ButtonIdTooLong {
            channel,
            id: button.id.clone(),
            limit: limits.max_button_id_length,
            unit: limits.button_id_unit.name(),
        });
    }

    if button.label.chars().count() > limits.max_label_length {
        return Err(UnibotError::ButtonLabelTooLong {
            channel,
            label: button.label.clone(),
            limit: limits.max_label_length,
        });
    }

    let invalid = |reason: &str| UnibotError::InvalidButtonStyle {
        channel,
        id: button.id.clone(),
        reason: reason.to_string(),
    };

    match (button.is_link(), button.url.is_some()) {
        (true, false) => return Err(invalid("link buttons require a URL")),
        (false, true) => return Err(invalid("URL can only be used with link style buttons")),
        _ => {}
    }

    if button.style.is_some() && !limits.supports_styles {
        return Err(invalid("button styles are not supported"));
    }
    if button.url.is_some() && !limits.supports_urls {
        return Err(invalid("URL buttons are not supported"));
    }

    Ok(())
}

/// Validates every button in `components`, returning them in order.
pub fn collect_buttons<'a>(
    channel: Channel,
    caps: &ChannelCapabilities,
    components: &'a [MessageComponent],
) -> UnibotResult<Vec<&'a Button>> {
    components
        .iter()
        .map(|component| match component {
            MessageComponent::Button(button) => {
                check_button(channel, caps, button)?;
                Ok(button)
            }
        })
        .collect()
}

/// Splits `items` into rows of at most `per_row`, keeping order. The last
/// row may be shorter. A `per_row` of zero is treated as one.
pub fn paginate<T>(items: &[T], per_row: usize) -> Vec<&[T]> {
    items.chunks(per_row.max(1)).collect()
}
