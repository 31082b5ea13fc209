use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use unibot_core::{
    Adapter, Channel, CoreEventHandler, Destination, HandlerSlot, Message, Renderer, UnibotError,
    UnibotResult,
};

use super::normalize::normalize_update;
use super::render::TelegramRenderer;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Header Telegram echoes the webhook `secret_token` in.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram adapter settings.
#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Token from @BotFather.
    #[serde(default)]
    pub bot_token: String,
    /// HTTP path the webhook is served on.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    /// Value expected in the `X-Telegram-Bot-Api-Secret-Token` header.
    #[serde(default)]
    pub secret_token: Option<String>,
    /// Bot API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Inline keyboard width.
    #[serde(default)]
    pub buttons_per_row: Option<usize>,
}

fn default_webhook_path() -> String {
    "/webhook/telegram".to_string()
}

fn default_api_base() -> String {
    TELEGRAM_API_BASE.to_string()
}

impl TelegramConfig {
    /// Config with defaults for everything but the token.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            webhook_path: default_webhook_path(),
            secret_token: None,
            api_base: default_api_base(),
            buttons_per_row: None,
        }
    }
}

// ── Telegram API response types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

// ── Implementation ──────────────────────────────────────────────────────────

/// Webhook-based Telegram adapter.
///
/// Updates are pushed in through [`handle_update`](Self::handle_update) by
/// whatever serves the webhook; replies go out through the Bot API.
pub struct TelegramAdapter {
    config: TelegramConfig,
    client: reqwest::Client,
    renderer: TelegramRenderer,
    handler: HandlerSlot,
}

impl TelegramAdapter {
    /// Builds the adapter. Nothing is contacted until the first send.
    pub fn new(config: TelegramConfig) -> Self {
        let renderer = match config.buttons_per_row {
            Some(per_row) => TelegramRenderer::with_buttons_per_row(per_row),
            None => TelegramRenderer::new(),
        };
        Self {
            config,
            client: reqwest::Client::new(),
            renderer,
            handler: HandlerSlot::new(),
        }
    }

    /// Path the webhook should be mounted on.
    pub fn webhook_path(&self) -> &str {
        &self.config.webhook_path
    }

    /// Renderer used for outgoing messages.
    pub fn renderer(&self) -> &TelegramRenderer {
        &self.renderer
    }

    /// Checks the secret-token header of a webhook request. Always passes when
    /// no secret is configured.
    ///
    /// Equal-length values are compared without early exit, so timing only
    /// reveals the secret's length.
    pub fn verify_secret(&self, header: Option<&str>) -> bool {
        let Some(expected) = self.config.secret_token.as_deref() else {
            return true;
        };
        let Some(provided) = header else {
            return false;
        };
        expected.len() == provided.len()
            && expected
                .bytes()
                .zip(provided.bytes())
                .fold(0u8, |diff, (x, y)| diff | (x ^ y))
                == 0
    }

    /// Processes one webhook update: normalize, then dispatch to the core.
    ///
    /// Fails if no core handler has been attached. Updates that do not
    /// normalize to an event are accepted and ignored.
    pub async fn handle_update(&self, update: Value) -> UnibotResult<()> {
        let handler = self.handler.get().ok_or_else(|| {
            UnibotError::Channel("Core handler not attached to Telegram adapter".to_string())
        })?;

        if let Some(callback_id) = update["callback_query"]["id"].as_str() {
            // Clears the loading indicator on the client
            if let Err(e) = self.answer_callback_query(callback_id).await {
                warn!(error = %e, "Failed to answer Telegram callback query");
            }
        }

        match normalize_update(&update) {
            Some(event) => {
                debug!(
                    event_type = %event.event_type,
                    user_id = %event.external_user_id,
                    "Telegram update received"
                );
                handler(event).await
            }
            None => {
                debug!(update_id = ?update.get("update_id"), "Ignoring Telegram update");
                Ok(())
            }
        }
    }

    /// Registers the webhook URL with Telegram.
    pub async fn set_webhook(&self, url: &str) -> UnibotResult<()> {
        let mut body = serde_json::json!({ "url": url });
        if let Some(secret) = &self.config.secret_token {
            body["secret_token"] = Value::String(secret.clone());
        }
        self.call("setWebhook", &body).await?;
        info!(url = %url, "Telegram webhook registered");
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> UnibotResult<()> {
        self.call(
            "answerCallbackQuery",
            &serde_json::json!({ "callback_query_id": callback_id }),
        )
        .await
    }

    async fn call(&self, method: &str, body: &Value) -> UnibotResult<()> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| UnibotError::Http(format!("Telegram {method} error: {e}")))?;

        let status = response.status();
        let body: TelegramResponse = response.json().await.map_err(|e| {
            UnibotError::Channel(format!("Telegram {method} parse error ({status}): {e}"))
        })?;

        if !body.ok {
            return Err(UnibotError::Channel(format!(
                "Telegram {method} failed: {}",
                body.description.unwrap_or_default()
            )));
        }

        Ok(())
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }
}

#[async_trait]
impl Adapter for TelegramAdapter {
    fn name(&self) -> Channel {
        Channel::Telegram
    }

    fn attach_core(&self, handler: CoreEventHandler) {
        self.handler.set(handler);
    }

    async fn send(&self, message: &Message, destination: &Destination) -> UnibotResult<()> {
        let payload = self.renderer.render(message)?;
        let method = payload.method();

        let mut body = serde_json::to_value(&payload)?;
        body["chat_id"] = Value::String(destination.target_id().to_string());

        self.call(method, &body).await?;
        debug!(method, chat_id = %destination.target_id(), "Telegram message sent");
        Ok(())
    }
}
