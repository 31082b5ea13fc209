//! `unibot.toml` loading.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};
use unibot_channels::{DiscordConfig, TelegramConfig};
use unibot_core::{UnibotError, UnibotResult};
use unibot_gateway::BotConfig;

/// Env var read when the Telegram token is not in the file.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
/// Env var read when the Discord token is not in the file.
pub const DISCORD_TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";

#[derive(Deserialize, Default)]
pub struct UnibotConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub discord: Option<DiscordConfig>,
}

#[derive(Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL to register as the Telegram webhook on startup.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

impl UnibotConfig {
    /// Reads `path`. A missing file yields the defaults; a malformed one is
    /// an error.
    pub fn load(path: &Path) -> UnibotResult<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw).map_err(|e| {
            UnibotError::Config(format!("Failed to parse '{}': {e}", path.display()))
        })
    }

    pub fn parse(raw: &str) -> UnibotResult<Self> {
        toml::from_str(raw).map_err(|e| UnibotError::Config(e.to_string()))
    }

    /// Fills empty tokens from the environment. A channel whose section is
    /// absent is enabled when its env var is set.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let env_token = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = env_token(TELEGRAM_TOKEN_ENV) {
            match self.telegram.as_mut() {
                Some(telegram) => {
                    if telegram.bot_token.is_empty() {
                        telegram.bot_token = token;
                    }
                }
                None => {
                    info!("Telegram enabled from {TELEGRAM_TOKEN_ENV}");
                    self.telegram = Some(TelegramConfig::new(token));
                }
            }
        }

        if let Some(token) = env_token(DISCORD_TOKEN_ENV) {
            match self.discord.as_mut() {
                Some(discord) => {
                    if discord.token.is_empty() {
                        discord.token = token;
                    }
                }
                None => {
                    info!("Discord enabled from {DISCORD_TOKEN_ENV}");
                    self.discord = Some(DiscordConfig::new(token));
                }
            }
        }
    }

    /// Rejects enabled channels that still have no token.
    pub fn validate(&self) -> UnibotResult<()> {
        if self.telegram.as_ref().is_some_and(|t| t.bot_token.is_empty()) {
            return Err(UnibotError::Config(format!(
                "telegram.bot_token is empty and {TELEGRAM_TOKEN_ENV} is not set"
            )));
        }
        if self.discord.as_ref().is_some_and(|d| d.token.is_empty()) {
            return Err(UnibotError::Config(format!(
                "discord.token is empty and {DISCORD_TOKEN_ENV} is not set"
            )));
        }
        Ok(())
    }

    pub fn bot_config(&self) -> BotConfig {
        BotConfig {
            telegram: self.telegram.clone(),
            discord: self.discord.clone(),
        }
    }
}
