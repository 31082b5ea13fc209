use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual style of a button. `Link` buttons open a URL instead of sending a
/// click event back to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    /// Main call to action.
    #[default]
    Primary,
    /// Neutral.
    Secondary,
    /// Positive outcome.
    Success,
    /// Destructive outcome.
    Danger,
    /// Opens `url`.
    Link,
}

impl fmt::Display for ButtonStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ButtonStyle::Primary => "primary",
            ButtonStyle::Secondary => "secondary",
            ButtonStyle::Success => "success",
            ButtonStyle::Danger => "danger",
            ButtonStyle::Link => "link",
        };
        f.write_str(name)
    }
}

/// An interactive button.
///
/// `style == Some(Link)` must go together with `url`; renderers reject any
/// other combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Payload returned in the `button_click` event.
    pub id: String,
    /// Text shown on the button.
    pub label: String,
    /// Optional style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    /// Target of a link button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Button {
    /// A plain callback button.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: None,
            url: None,
        }
    }

    /// A link button pointing at `url`.
    pub fn link(id: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: Some(ButtonStyle::Link),
            url: Some(url.into()),
        }
    }

    /// Sets the style.
    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Whether this is a link-style button.
    pub fn is_link(&self) -> bool {
        self.style == Some(ButtonStyle::Link)
    }
}

/// An interactive element attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageComponent {
    /// A button.
    Button(Button),
}

impl From<Button> for MessageComponent {
    fn from(button: Button) -> Self {
        MessageComponent::Button(button)
    }
}
