//! Static per-channel limits used to validate and adapt messages.

use crate::{Channel, ContentKind};

/// Unit a length limit is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// UTF-8 bytes.
    Bytes,
    /// Unicode scalar values.
    Chars,
    /// UTF-16 code units; astral-plane characters such as emoji count twice.
    Utf16,
}

impl LengthUnit {
    /// Length of `s` in this unit.
    pub fn measure(self, s: &str) -> usize {
        match self {
            LengthUnit::Bytes => s.len(),
            LengthUnit::Chars => s.chars().count(),
            LengthUnit::Utf16 => s.encode_utf16().count(),
        }
    }

    /// Plural name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            LengthUnit::Bytes => "bytes",
            LengthUnit::Chars => "characters",
            LengthUnit::Utf16 => "UTF-16 code units",
        }
    }
}

/// What a channel can carry as message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentCapabilities {
    /// Longest text body; `None` means unlimited.
    pub max_text_length: Option<usize>,
    /// Longest image caption; `None` means unlimited.
    pub max_caption_length: Option<usize>,
    /// Unit both text and caption limits are measured in.
    pub text_unit: LengthUnit,
    /// Whether image content can be sent at all.
    pub supports_images: bool,
    /// Whether the caption travels inline with the image.
    pub supports_image_caption: bool,
    /// In bytes.
    pub max_image_size: Option<u64>,
}

impl ContentCapabilities {
    /// Whether the channel can deliver content of `kind`.
    pub fn supports(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Text => true,
            ContentKind::Image => self.supports_images,
            ContentKind::Video | ContentKind::Audio | ContentKind::File => false,
        }
    }
}

/// Button limits of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonCapabilities {
    /// Hard platform limit; renderers may apply a lower UX limit.
    pub max_buttons_per_row: usize,
    /// Longest button id, in `button_id_unit`.
    pub max_button_id_length: usize,
    /// Unit `max_button_id_length` is measured in.
    pub button_id_unit: LengthUnit,
    /// Longest label, in characters.
    pub max_label_length: usize,
    /// Whether [`ButtonStyle`](crate::ButtonStyle) values are honoured.
    pub supports_styles: bool,
    /// Whether link buttons can be rendered.
    pub supports_urls: bool,
}

/// Everything a renderer needs to know about a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCapabilities {
    /// Content limits.
    pub content: ContentCapabilities,
    /// Button limits.
    pub button: ButtonCapabilities,
}

/// Telegram Bot API limits.
pub const TELEGRAM_CAPABILITIES: ChannelCapabilities = ChannelCapabilities {
    content: ContentCapabilities {
        max_text_length: Some(4096),
        max_caption_length: Some(1024),
        // Bot API counts message and caption length in UTF-16 code units
        text_unit: LengthUnit::Utf16,
        supports_images: true,
        supports_image_caption: true,
        max_image_size: Some(10 * 1024 * 1024),
    },
    button: ButtonCapabilities {
        max_buttons_per_row: 8,
        // callback_data is limited in bytes, not characters
        max_button_id_length: 64,
        button_id_unit: LengthUnit::Bytes,
        max_label_length: 64,
        supports_styles: false,
        // URL buttons are a separate keyboard type, not produced by the renderer
        supports_urls: false,
    },
};

/// Discord REST API limits.
pub const DISCORD_CAPABILITIES: ChannelCapabilities = ChannelCapabilities {
    content: ContentCapabilities {
        max_text_length: Some(2000),
        max_caption_length: Some(4096),
        text_unit: LengthUnit::Chars,
        supports_images: true,
        supports_image_caption: false,
        max_image_size: Some(25 * 1024 * 1024),
    },
    button: ButtonCapabilities {
        max_buttons_per_row: 5,
        max_button_id_length: 100,
        button_id_unit: LengthUnit::Chars,
        max_label_length: 80,
        supports_styles: true,
        supports_urls: true,
    },
};

/// Capability table of `channel`.
pub fn capabilities(channel: Channel) -> &'static ChannelCapabilities {
    match channel {
        Channel::Telegram => &TELEGRAM_CAPABILITIES,
        Channel::Discord => &DISCORD_CAPABILITIES,
    }
}
