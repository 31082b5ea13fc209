use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary payload of an outbound message.
///
/// Exactly one variant per message. Video, audio and file are declared in
/// [`ContentKind`] for capability tables but have no variant yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text.
    Text {
        /// The text to send.
        text: String,
    },
    /// An image referenced by URL, with an optional caption.
    Image {
        /// Publicly reachable image URL.
        url: String,
        /// Caption shown with the image.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

impl Content {
    /// Text content.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    /// Image content without a caption.
    pub fn image(url: impl Into<String>) -> Self {
        Content::Image {
            url: url.into(),
            caption: None,
        }
    }

    /// Image content with a caption.
    pub fn image_with_caption(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Content::Image {
            url: url.into(),
            caption: Some(caption.into()),
        }
    }

    /// The kind of this content.
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Text { .. } => ContentKind::Text,
            Content::Image { .. } => ContentKind::Image,
        }
    }
}

/// Every content kind a channel may declare support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Plain text.
    Text,
    /// Still image.
    Image,
    /// Video clip.
    Video,
    /// Audio clip.
    Audio,
    /// Arbitrary file attachment.
    File,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::Audio => "audio",
            ContentKind::File => "file",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_tagged_by_type() {
        let json = serde_json::to_value(Content::image_with_caption("https://x/y.png", "hi")).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["caption"], "hi");

        let text: Content = serde_json::from_str(r#"{"type":"text","text":"hello"}"#).unwrap();
        assert_eq!(text, Content::text("hello"));
    }

    #[test]
    fn test_unknown_content_type_is_rejected() {
        let res = serde_json::from_str::<Content>(r#"{"type":"video","url":"x"}"#);
        assert!(res.is_err());
    }
}
