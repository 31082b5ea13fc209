use crate::Channel;

/// A convenience `Result` alias using [`UnibotError`].
pub type UnibotResult<T> = Result<T, UnibotError>;

/// Top-level error type for Unibot.
///
/// Validation variants always carry the channel and the limit that was
/// violated so the message can be shown to the developer as-is.
#[derive(Debug, thiserror::Error)]
pub enum UnibotError {
    /// Text content is longer than the channel allows.
    #[error("Text exceeds {} limit of {limit} characters (got {actual})", .channel.display_name())]
    ContentTooLong {
        /// Channel the message was rendered for.
        channel: Channel,
        /// Maximum allowed length.
        limit: usize,
        /// Length of the offending text.
        actual: usize,
    },

    /// Image caption is longer than the channel allows.
    #[error("Caption exceeds {} limit of {limit} characters (got {actual})", .channel.display_name())]
    CaptionTooLong {
        /// Channel the message was rendered for.
        channel: Channel,
        /// Maximum allowed length.
        limit: usize,
        /// Length of the offending caption.
        actual: usize,
    },

    /// Button id is longer than the channel allows.
    #[error("Button ID \"{id}\" exceeds {} limit of {limit} {unit}", .channel.display_name())]
    ButtonIdTooLong {
        /// Channel the message was rendered for.
        channel: Channel,
        /// The offending id.
        id: String,
        /// Maximum allowed length.
        limit: usize,
        /// Unit the limit is measured in ("bytes" or "characters").
        unit: &'static str,
    },

    /// Button label is longer than the channel allows.
    #[error("Button label \"{label}\" exceeds {} limit of {limit} characters", .channel.display_name())]
    ButtonLabelTooLong {
        /// Channel the message was rendered for.
        channel: Channel,
        /// The offending label.
        label: String,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Button style / URL combination the channel cannot express.
    #[error("Invalid button \"{id}\" for {}: {reason}", .channel.display_name())]
    InvalidButtonStyle {
        /// Channel the message was rendered for.
        channel: Channel,
        /// Id of the offending button.
        id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Content kind the channel cannot deliver.
    #[error("{} does not support {kind} content", .channel.display_name())]
    UnsupportedContent {
        /// Channel the message was rendered for.
        channel: Channel,
        /// Content kind, e.g. "image".
        kind: String,
    },

    /// A channel-specific handle was requested but never configured.
    #[error("{} adapter is not configured", .0.display_name())]
    NotConfigured(Channel),

    /// An unrecognized message, content or channel variant.
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from a channel transport (webhook, gateway, platform API).
    #[error("Channel error: {0}")]
    Channel(String),

    /// An error from an outbound HTTP request.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error reported by a user event handler.
    #[error("Handler error: {0}")]
    Handler(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UnibotError {
    /// Whether this error is a render-time validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UnibotError::ContentTooLong { .. }
                | UnibotError::CaptionTooLong { .. }
                | UnibotError::ButtonIdTooLong { .. }
                | UnibotError::ButtonLabelTooLong { .. }
                | UnibotError::InvalidButtonStyle { .. }
                | UnibotError::UnsupportedContent { .. }
        )
    }
}
