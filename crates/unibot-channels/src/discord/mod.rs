//! Discord integration (gateway WebSocket in, REST API out).

mod adapter;
mod gateway;
mod normalize;
mod render;

pub use adapter::{intents, DiscordAdapter, DiscordConfig};
pub use normalize::{
    normalize_dispatch, normalize_interaction, normalize_member_add, normalize_message_create,
    normalize_reaction_add,
};
pub use render::{
    style_code, ActionRow, DiscordButton, DiscordContent, DiscordPayload, DiscordRenderer, Embed,
    EmbedImage,
};
