//! Telegram Bot API integration (webhook in, Bot API out).

mod adapter;
mod normalize;
mod render;

pub use adapter::{TelegramAdapter, TelegramConfig, SECRET_TOKEN_HEADER};
pub use normalize::normalize_update;
pub use render::{
    InlineKeyboardButton, InlineKeyboardMarkup, TelegramContent, TelegramPayload,
    TelegramRenderer, DEFAULT_BUTTONS_PER_ROW,
};
