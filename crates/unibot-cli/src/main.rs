//! `unibot` — run an echo bot or preview how a message renders per channel.

mod config;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use unibot_channels::{DiscordRenderer, TelegramRenderer};
use unibot_core::{Channel, EventType, Message, OutgoingMessage, Renderer, UnibotResult};
use unibot_gateway::Bot;

use crate::config::UnibotConfig;

#[derive(Parser)]
#[command(name = "unibot", about = "Unibot — one bot, many chat platforms")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "unibot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the echo bot on every configured channel
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the native payload a message renders to
    Render {
        /// Target channel (telegram, discord)
        #[arg(long)]
        channel: Channel,
        /// JSON file holding a message, in either the component or the legacy form
        #[arg(long)]
        message: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "Failed to load .env");
        }
    }

    let cli = Cli::parse();

    let mut config = UnibotConfig::load(&cli.config)?;
    config.apply_env(|name| std::env::var(name).ok());

    match cli.command {
        Commands::Serve { host, port } => {
            config.validate()?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(&config, &format!("{host}:{port}")).await?;
        }
        Commands::Render { channel, message } => {
            let message = read_message(&message)?;
            let payload = match channel {
                Channel::Telegram => {
                    let renderer = match config.telegram.as_ref().and_then(|t| t.buttons_per_row) {
                        Some(per_row) => TelegramRenderer::with_buttons_per_row(per_row),
                        None => TelegramRenderer::new(),
                    };
                    renderer.render_json(&message)?
                }
                Channel::Discord => DiscordRenderer::new().render_json(&message)?,
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}

async fn serve(config: &UnibotConfig, addr: &str) -> UnibotResult<()> {
    let bot = Bot::new(config.bot_config());
    if bot.channels().is_empty() {
        warn!("No channels configured; only /health will be served");
    }

    bot.on(EventType::Message, |ctx| async move {
        ctx.reply(Message::text(format!("Hello from {}!", ctx.channel())))
            .await
    });

    bot.start().await?;

    if let (Ok(telegram), Some(public_url)) = (bot.require_telegram(), &config.server.public_url) {
        let url = format!("{}{}", public_url.trim_end_matches('/'), telegram.webhook_path());
        telegram.set_webhook(&url).await?;
    }

    info!(addr = %addr, channels = ?bot.channels(), "Starting Unibot");
    unibot_gateway::serve(&bot, addr, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Reads a message file. Objects with a top-level `type` are the legacy
/// `{type: text|image|buttons}` shape.
fn read_message(path: &Path) -> UnibotResult<Message> {
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    if value.get("type").is_some() {
        Ok(OutgoingMessage::from_json(&value)?.into())
    } else {
        Ok(serde_json::from_value(value)?)
    }
}
