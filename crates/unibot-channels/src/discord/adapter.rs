use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use unibot_core::{
    Adapter, Channel, CoreEventHandler, Destination, HandlerSlot, Message, Renderer, UnibotError,
    UnibotResult,
};

use super::gateway;
use super::normalize::normalize_dispatch;
use super::render::DiscordRenderer;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const DISCORD_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Gateway intent bits.
pub mod intents {
    /// Guild create/update, channel events.
    pub const GUILDS: u64 = 1 << 0;
    /// `GUILD_MEMBER_ADD` and friends (privileged).
    pub const GUILD_MEMBERS: u64 = 1 << 1;
    /// Messages in guild channels.
    pub const GUILD_MESSAGES: u64 = 1 << 9;
    /// Reactions in guild channels.
    pub const GUILD_MESSAGE_REACTIONS: u64 = 1 << 10;
    /// Messages in DMs.
    pub const DIRECT_MESSAGES: u64 = 1 << 12;
    /// Message text (privileged).
    pub const MESSAGE_CONTENT: u64 = 1 << 15;

    /// What the bot needs to see messages, reactions and joins.
    pub const DEFAULT: u64 =
        GUILDS | GUILD_MEMBERS | GUILD_MESSAGES | GUILD_MESSAGE_REACTIONS | MESSAGE_CONTENT;
}

/// Interaction callback type: acknowledge a component click without a
/// visible reply.
const DEFERRED_UPDATE_MESSAGE: u8 = 6;

/// Discord adapter settings.
#[derive(Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token.
    #[serde(default)]
    pub token: String,
    /// REST API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Gateway WebSocket URL.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Gateway intents bitfield.
    #[serde(default = "default_intents")]
    pub intents: u64,
}

fn default_api_base() -> String {
    DISCORD_API_BASE.to_string()
}

fn default_gateway_url() -> String {
    DISCORD_GATEWAY_URL.to_string()
}

fn default_intents() -> u64 {
    intents::DEFAULT
}

impl DiscordConfig {
    /// Config with default endpoints and intents.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: default_api_base(),
            gateway_url: default_gateway_url(),
            intents: default_intents(),
        }
    }
}

/// State shared between the adapter and its gateway task.
pub(crate) struct DiscordInner {
    pub(crate) config: DiscordConfig,
    client: reqwest::Client,
    renderer: DiscordRenderer,
    handler: HandlerSlot,
    bot_user_id: RwLock<Option<String>>,
}

impl DiscordInner {
    /// Handles one gateway dispatch.
    pub(crate) async fn handle_dispatch(&self, name: &str, data: Value) -> UnibotResult<()> {
        if name == "READY" {
            let user_id = crate::json::id_of(&data["user"]["id"]);
            info!(bot_user_id = ?user_id, "Discord gateway ready");
            *self.bot_user_id.write() = user_id;
            return Ok(());
        }

        let Some(event) = normalize_dispatch(name, &data) else {
            debug!(dispatch = %name, "Ignoring Discord dispatch");
            return Ok(());
        };

        // The bot flag is missing on some payloads, e.g. reactions in DMs
        if self.bot_user_id.read().as_deref() == Some(event.external_user_id.as_str()) {
            debug!(dispatch = %name, "Ignoring Discord dispatch from own user");
            return Ok(());
        }

        if name == "INTERACTION_CREATE" {
            // Discord shows an error unless the click is acknowledged promptly
            if let Err(e) = self.ack_interaction(&data).await {
                warn!(error = %e, "Failed to acknowledge Discord interaction");
            }
        }

        let handler = self.handler.get().ok_or_else(|| {
            UnibotError::Channel("Core handler not attached to Discord adapter".to_string())
        })?;

        debug!(
            event_type = %event.event_type,
            user_id = %event.external_user_id,
            "Discord event received"
        );
        handler(event).await
    }

    async fn ack_interaction(&self, interaction: &Value) -> UnibotResult<()> {
        let id = crate::json::id_or_empty(&interaction["id"]);
        let token = interaction["token"].as_str().unwrap_or_default();
        self.post(
            &format!("/interactions/{id}/{token}/callback"),
            &serde_json::json!({ "type": DEFERRED_UPDATE_MESSAGE }),
        )
        .await?;
        Ok(())
    }

    async fn open_dm(&self, user_id: &str) -> UnibotResult<String> {
        let response = self
            .post(
                "/users/@me/channels",
                &serde_json::json!({ "recipient_id": user_id }),
            )
            .await?;
        let channel: Value = response
            .json()
            .await
            .map_err(|e| UnibotError::Channel(format!("Discord DM channel parse error: {e}")))?;
        crate::json::id_of(&channel["id"]).ok_or_else(|| {
            UnibotError::Channel(format!("Discord returned no DM channel for user {user_id}"))
        })
    }

    async fn post(&self, path: &str, body: &Value) -> UnibotResult<reqwest::Response> {
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.config.token))
            .json(body)
            .send()
            .await
            .map_err(|e| UnibotError::Http(format!("Discord API error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(UnibotError::Channel(format!(
                "Discord API error ({status}): {text}"
            )));
        }

        Ok(response)
    }
}

/// Gateway-based Discord adapter.
///
/// [`start`](Adapter::start) spawns a background task that keeps a gateway
/// session open; replies go out through the REST API.
pub struct DiscordAdapter {
    inner: Arc<DiscordInner>,
    gateway_task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscordAdapter {
    /// Creates the adapter. Nothing connects until [`start`](Adapter::start).
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            inner: Arc::new(DiscordInner {
                config,
                client: reqwest::Client::new(),
                renderer: DiscordRenderer::new(),
                handler: HandlerSlot::new(),
                bot_user_id: RwLock::new(None),
            }),
            gateway_task: Mutex::new(None),
        }
    }

    /// Renderer used for outgoing messages.
    pub fn renderer(&self) -> &DiscordRenderer {
        &self.inner.renderer
    }

    /// The bot's own user id, known once the gateway reported READY.
    pub fn bot_user_id(&self) -> Option<String> {
        self.inner.bot_user_id.read().clone()
    }

    /// Feeds one gateway dispatch (`t` name and `d` payload) through the
    /// adapter, exactly as the gateway task does.
    pub async fn handle_dispatch(&self, name: &str, data: Value) -> UnibotResult<()> {
        self.inner.handle_dispatch(name, data).await
    }

    /// Whether the gateway task is running.
    pub fn is_running(&self) -> bool {
        self.gateway_task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stops the gateway task.
    pub fn stop(&self) {
        if let Some(task) = self.gateway_task.lock().take() {
            task.abort();
            info!("Discord gateway stopped");
        }
    }
}

impl Drop for DiscordAdapter {
    fn drop(&mut self) {
        self.stop();
    }
}

#[async_trait]
impl Adapter for DiscordAdapter {
    fn name(&self) -> Channel {
        Channel::Discord
    }

    fn attach_core(&self, handler: CoreEventHandler) {
        self.inner.handler.set(handler);
    }

    async fn start(&self) -> UnibotResult<()> {
        if self.inner.config.token.is_empty() {
            return Err(UnibotError::Config("Discord token is empty".to_string()));
        }

        let mut task = self.gateway_task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("Discord gateway already running");
            return Ok(());
        }
        *task = Some(tokio::spawn(gateway::supervise(self.inner.clone())));
        info!("Discord gateway task started");
        Ok(())
    }

    async fn send(&self, message: &Message, destination: &Destination) -> UnibotResult<()> {
        let payload = self.inner.renderer.render(message)?;

        let channel_id = match &destination.external_chat_id {
            Some(chat_id) => chat_id.clone(),
            None => self.inner.open_dm(&destination.external_user_id).await?,
        };

        self.inner
            .post(
                &format!("/channels/{channel_id}/messages"),
                &serde_json::to_value(&payload)?,
            )
            .await?;
        debug!(channel_id = %channel_id, "Discord message sent");
        Ok(())
    }
}
