use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use serde::Deserialize;
use tracing::{info, warn};
use unibot_channels::{DiscordAdapter, DiscordConfig, TelegramAdapter, TelegramConfig};
use unibot_core::{
    Adapter, Channel, Context, CoreEventHandler, EventType, Router, UnibotError, UnibotResult,
};

/// Which channels to enable. A `None` channel gets no adapter.
#[derive(Clone, Default, Deserialize)]
pub struct BotConfig {
    /// Telegram settings.
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    /// Discord settings.
    #[serde(default)]
    pub discord: Option<DiscordConfig>,
}

/// The entry point applications use: owns the router and one adapter per
/// configured channel.
pub struct Bot {
    router: Arc<Router>,
    adapters: HashMap<Channel, Arc<dyn Adapter>>,
    telegram: Option<Arc<TelegramAdapter>>,
    discord: Option<Arc<DiscordAdapter>>,
}

impl Bot {
    /// Builds adapters for every configured channel and wires them to a
    /// fresh router.
    pub fn new(config: BotConfig) -> Self {
        let telegram = config.telegram.map(|c| Arc::new(TelegramAdapter::new(c)));
        let discord = config.discord.map(|c| Arc::new(DiscordAdapter::new(c)));

        let mut adapters: Vec<Arc<dyn Adapter>> = Vec::new();
        if let Some(adapter) = &telegram {
            adapters.push(adapter.clone());
        }
        if let Some(adapter) = &discord {
            adapters.push(adapter.clone());
        }

        let mut bot = Self::with_adapters(adapters);
        bot.telegram = telegram;
        bot.discord = discord;
        bot
    }

    /// Wires pre-built adapters to a fresh router. A later adapter for the
    /// same channel replaces an earlier one.
    ///
    /// Only [`adapter`](Self::adapter) sees these; the typed accessors
    /// ([`require_telegram`](Self::require_telegram), ...) are reserved for
    /// the built-in adapters created by [`new`](Self::new).
    pub fn with_adapters(adapters: impl IntoIterator<Item = Arc<dyn Adapter>>) -> Self {
        let router = Arc::new(Router::new());
        let mut map = HashMap::new();

        for adapter in adapters {
            let channel = adapter.name();
            adapter.attach_core(core_handler(router.clone(), Arc::downgrade(&adapter)));
            if map.insert(channel, adapter).is_some() {
                warn!(channel = %channel, "Replacing previously registered adapter");
            }
        }

        Self {
            router,
            adapters: map,
            telegram: None,
            discord: None,
        }
    }

    /// Registers a handler for one event type.
    pub fn on<F, Fut>(&self, event_type: EventType, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = UnibotResult<()>> + Send + 'static,
    {
        self.router.on(event_type, handler);
    }

    /// The router events are dispatched through.
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Starts every adapter, in channel order. Stops at the first failure.
    pub async fn start(&self) -> UnibotResult<()> {
        for channel in Channel::ALL {
            if let Some(adapter) = self.adapters.get(&channel) {
                adapter.start().await?;
                info!(channel = %channel, "Adapter started");
            }
        }
        Ok(())
    }

    /// Channels with an adapter.
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.adapters.contains_key(c))
            .collect()
    }

    /// The adapter serving `channel`.
    pub fn adapter(&self, channel: Channel) -> UnibotResult<Arc<dyn Adapter>> {
        self.adapters
            .get(&channel)
            .cloned()
            .ok_or(UnibotError::NotConfigured(channel))
    }

    /// The built-in Telegram adapter.
    pub fn require_telegram(&self) -> UnibotResult<Arc<TelegramAdapter>> {
        self.telegram
            .clone()
            .ok_or(UnibotError::NotConfigured(Channel::Telegram))
    }

    /// The built-in Discord adapter.
    pub fn require_discord(&self) -> UnibotResult<Arc<DiscordAdapter>> {
        self.discord
            .clone()
            .ok_or(UnibotError::NotConfigured(Channel::Discord))
    }
}

/// Dispatch function attached to an adapter. Holds the adapter weakly so the
/// adapter → handler → adapter loop does not leak.
fn core_handler(router: Arc<Router>, adapter: Weak<dyn Adapter>) -> CoreEventHandler {
    Arc::new(move |event| {
        let router = router.clone();
        let adapter = adapter.upgrade();
        async move {
            let adapter = adapter.ok_or_else(|| {
                UnibotError::Channel(format!(
                    "{} adapter was dropped",
                    event.channel.display_name()
                ))
            })?;
            router.handle(event, adapter).await
        }
        .boxed()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_has_no_adapters() {
        let bot = Bot::new(BotConfig::default());
        assert!(bot.channels().is_empty());

        let err = bot.require_telegram().err().unwrap();
        assert!(matches!(err, UnibotError::NotConfigured(Channel::Telegram)));
        assert_eq!(err.to_string(), "Telegram adapter is not configured");

        let err = bot.require_discord().err().unwrap();
        assert_eq!(err.to_string(), "Discord adapter is not configured");
        assert!(bot.adapter(Channel::Discord).is_err());
    }

    #[test]
    fn test_configured_channels() {
        let bot = Bot::new(BotConfig {
            telegram: Some(TelegramConfig::new("t")),
            discord: None,
        });
        assert_eq!(bot.channels(), vec![Channel::Telegram]);
        assert!(bot.require_telegram().is_ok());
        assert_eq!(bot.adapter(Channel::Telegram).unwrap().name(), Channel::Telegram);
        assert!(bot.require_discord().is_err());
    }

    #[test]
    fn test_config_deserializes_sections() {
        let config: BotConfig = serde_json::from_value(serde_json::json!({
            "telegram": {"bot_token": "abc"}
        }))
        .unwrap();
        assert!(config.telegram.is_some());
        assert!(config.discord.is_none());
    }

    #[tokio::test]
    async fn test_start_without_adapters_is_noop() {
        Bot::new(BotConfig::default()).start().await.unwrap();
    }
}
