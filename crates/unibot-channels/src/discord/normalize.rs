//! Discord gateway dispatch → [`IncomingEvent`].
//!
//! Each function takes the `d` field of a dispatch frame.

use serde_json::Value;
use unibot_core::{Channel, EventType, IncomingEvent};

use crate::json::{id_of, id_or_empty, is_true, string_of};

const INTERACTION_MESSAGE_COMPONENT: u64 = 3;
const COMPONENT_BUTTON: u64 = 2;

/// Routes a dispatch by its `t` name. Unknown dispatches yield `None`.
pub fn normalize_dispatch(name: &str, data: &Value) -> Option<IncomingEvent> {
    match name {
        "MESSAGE_CREATE" => normalize_message_create(data),
        "INTERACTION_CREATE" => normalize_interaction(data),
        "MESSAGE_REACTION_ADD" => normalize_reaction_add(data),
        "GUILD_MEMBER_ADD" => normalize_member_add(data),
        _ => None,
    }
}

/// `MESSAGE_CREATE` → [`EventType::Message`]. Bot authors are dropped.
pub fn normalize_message_create(data: &Value) -> Option<IncomingEvent> {
    let author = &data["author"];
    if is_true(&author["bot"]) {
        return None;
    }

    Some(
        IncomingEvent::new(
            Channel::Discord,
            EventType::Message,
            id_or_empty(&author["id"]),
            data.clone(),
        )
        .with_chat_id(id_or_empty(&data["channel_id"]))
        .with_text(string_of(&data["content"]))
        .with_message_id(id_of(&data["id"])),
    )
}

/// Only button clicks on message components are modelled.
pub fn normalize_interaction(data: &Value) -> Option<IncomingEvent> {
    if data["type"].as_u64() != Some(INTERACTION_MESSAGE_COMPONENT)
        || data["data"]["component_type"].as_u64() != Some(COMPONENT_BUTTON)
    {
        return None;
    }

    // Guild interactions carry `member.user`, DMs carry `user`
    let user = match &data["member"]["user"] {
        Value::Object(_) => &data["member"]["user"],
        _ => &data["user"],
    };
    if is_true(&user["bot"]) {
        return None;
    }

    Some(
        IncomingEvent::new(
            Channel::Discord,
            EventType::ButtonClick,
            id_or_empty(&user["id"]),
            data.clone(),
        )
        .with_chat_id(id_or_empty(&data["channel_id"]))
        .with_text(string_of(&data["data"]["custom_id"]))
        .with_message_id(id_of(&data["message"]["id"])),
    )
}

/// `MESSAGE_REACTION_ADD` → [`EventType::Reaction`], unless a bot reacted.
pub fn normalize_reaction_add(data: &Value) -> Option<IncomingEvent> {
    if is_true(&data["member"]["user"]["bot"]) {
        return None;
    }

    let emoji = emoji_display(&data["emoji"])?;

    Some(
        IncomingEvent::new(
            Channel::Discord,
            EventType::Reaction,
            id_or_empty(&data["user_id"]),
            data.clone(),
        )
        .with_chat_id(id_or_empty(&data["channel_id"]))
        .with_message_id(id_of(&data["message_id"]))
        .with_reaction(emoji),
    )
}

/// `GUILD_MEMBER_ADD` → [`EventType::Join`]. Bots joining are dropped.
pub fn normalize_member_add(data: &Value) -> Option<IncomingEvent> {
    let user = &data["user"];
    if is_true(&user["bot"]) {
        return None;
    }

    let user_id = id_or_empty(&user["id"]);
    Some(
        IncomingEvent::new(Channel::Discord, EventType::Join, user_id.clone(), data.clone())
            .with_chat_id(id_or_empty(&data["guild_id"]))
            .with_joined_user_id(user_id),
    )
}

/// Unicode emoji come through as their name; custom emoji use the message
/// mention syntax so they can be echoed back.
fn emoji_display(emoji: &Value) -> Option<String> {
    let name = string_of(&emoji["name"]);
    match id_of(&emoji["id"]) {
        Some(id) => {
            let prefix = if is_true(&emoji["animated"]) { "a" } else { "" };
            Some(format!("<{prefix}:{}:{id}>", name.unwrap_or_default()))
        }
        None => name,
    }
}
