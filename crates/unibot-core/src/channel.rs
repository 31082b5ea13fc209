use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UnibotError;

/// A messaging platform Unibot can talk to.
///
/// Adding a platform means adding a variant here together with its
/// capability table and a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Telegram Bot API.
    Telegram,
    /// Discord bot (gateway + REST).
    Discord,
}

impl Channel {
    /// Every known channel, in declaration order.
    pub const ALL: [Channel; 2] = [Channel::Telegram, Channel::Discord];

    /// Lowercase wire name of the channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Telegram => "telegram",
            Channel::Discord => "discord",
        }
    }

    /// Human-facing name, used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Channel::Telegram => "Telegram",
            Channel::Discord => "Discord",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = UnibotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "telegram" => Ok(Channel::Telegram),
            "discord" => Ok(Channel::Discord),
            other => Err(UnibotError::UnknownVariant(format!("channel '{other}'"))),
        }
    }
}
