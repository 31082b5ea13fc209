//! Telegram update → [`IncomingEvent`].

use serde_json::Value;
use unibot_core::{Channel, EventType, IncomingEvent};

use crate::json::{id_of, id_or_empty, is_true, object, string_of};

/// Normalizes a Telegram `Update` (webhook body or `getUpdates` item).
///
/// Returns `None` for bot-authored updates and for update kinds that are not
/// modelled, such as `edited_message` or `channel_post`.
pub fn normalize_update(update: &Value) -> Option<IncomingEvent> {
    if let Some(message) = object(update, "message") {
        return normalize_message(update, message);
    }
    if let Some(callback) = object(update, "callback_query") {
        return normalize_callback_query(update, callback);
    }
    if let Some(reaction) = object(update, "message_reaction") {
        return normalize_reaction(update, reaction);
    }
    None
}

fn normalize_message(update: &Value, message: &Value) -> Option<IncomingEvent> {
    let from = &message["from"];
    if is_true(&from["is_bot"]) {
        return None;
    }

    let user_id = id_or_empty(&from["id"]);
    let chat_id = id_or_empty(&message["chat"]["id"]);

    // Service message announcing new members
    if let Some(joined) = message["new_chat_members"]
        .as_array()
        .and_then(|members| members.first())
    {
        return Some(
            IncomingEvent::new(Channel::Telegram, EventType::Join, user_id, update.clone())
                .with_chat_id(chat_id)
                .with_joined_user_id(id_or_empty(&joined["id"])),
        );
    }

    Some(
        IncomingEvent::new(Channel::Telegram, EventType::Message, user_id, update.clone())
            .with_chat_id(chat_id)
            .with_text(string_of(&message["text"]))
            .with_message_id(id_of(&message["message_id"])),
    )
}

fn normalize_callback_query(update: &Value, callback: &Value) -> Option<IncomingEvent> {
    let from = &callback["from"];
    if is_true(&from["is_bot"]) {
        return None;
    }

    let message = &callback["message"];
    Some(
        IncomingEvent::new(
            Channel::Telegram,
            EventType::ButtonClick,
            id_or_empty(&from["id"]),
            update.clone(),
        )
        .with_chat_id(id_or_empty(&message["chat"]["id"]))
        .with_text(string_of(&callback["data"]))
        .with_message_id(id_of(&message["message_id"])),
    )
}

fn normalize_reaction(update: &Value, reaction: &Value) -> Option<IncomingEvent> {
    let user = &reaction["user"];
    if is_true(&user["is_bot"]) {
        return None;
    }

    // Removing a reaction leaves new_reaction empty
    let emoji = reaction["new_reaction"]
        .as_array()
        .and_then(|list| list.first())
        .and_then(reaction_emoji)?;

    // Anonymous group admins react as the chat itself
    let user_id = id_of(&user["id"])
        .or_else(|| id_of(&reaction["actor_chat"]["id"]))
        .unwrap_or_default();

    Some(
        IncomingEvent::new(Channel::Telegram, EventType::Reaction, user_id, update.clone())
            .with_chat_id(id_or_empty(&reaction["chat"]["id"]))
            .with_message_id(id_of(&reaction["message_id"]))
            .with_reaction(emoji),
    )
}

/// `ReactionType` → display string. Accepts the Bot API shape
/// (`{"type":"emoji","emoji":"👍"}`), custom emoji, and the nested
/// `{"emoji":{"emoji":..,"name":..}}` shape some proxies forward.
fn reaction_emoji(reaction: &Value) -> Option<String> {
    match &reaction["emoji"] {
        Value::String(emoji) => Some(emoji.clone()),
        nested @ Value::Object(_) => string_of(&nested["emoji"]).or_else(|| string_of(&nested["name"])),
        _ => string_of(&reaction["custom_emoji_id"]),
    }
}
