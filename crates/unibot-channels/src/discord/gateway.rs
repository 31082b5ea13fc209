//! Discord gateway (WebSocket) session handling.
//!
//! One session runs HELLO → IDENTIFY → heartbeat/dispatch until the socket
//! closes or Discord asks for a reconnect. [`supervise`] keeps sessions
//! running with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};
use unibot_core::{UnibotError, UnibotResult};

use super::adapter::DiscordInner;

pub(crate) const OP_DISPATCH: u8 = 0;
pub(crate) const OP_HEARTBEAT: u8 = 1;
pub(crate) const OP_IDENTIFY: u8 = 2;
pub(crate) const OP_RECONNECT: u8 = 7;
pub(crate) const OP_INVALID_SESSION: u8 = 9;
pub(crate) const OP_HELLO: u8 = 10;
pub(crate) const OP_HEARTBEAT_ACK: u8 = 11;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// A gateway payload, in either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GatewayFrame {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayFrame {
    fn new(op: u8, d: Value) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }

    fn to_ws(&self) -> UnibotResult<WsMessage> {
        Ok(WsMessage::Text(serde_json::to_string(self)?))
    }
}

fn identify(token: &str, intents: u64) -> GatewayFrame {
    GatewayFrame::new(
        OP_IDENTIFY,
        serde_json::json!({
            "token": token,
            "intents": intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "unibot",
                "device": "unibot"
            }
        }),
    )
}

fn heartbeat(seq: Option<u64>) -> GatewayFrame {
    GatewayFrame::new(OP_HEARTBEAT, seq.map_or(Value::Null, Value::from))
}

/// Runs gateway sessions until the task is aborted.
pub(crate) async fn supervise(inner: Arc<DiscordInner>) {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match run_session(&inner).await {
            Ok(()) => {
                info!("Discord gateway session ended, reconnecting");
                backoff = INITIAL_BACKOFF;
                tokio::time::sleep(INITIAL_BACKOFF).await;
            }
            Err(e) => {
                error!(error = %e, backoff_secs = backoff.as_secs(), "Discord gateway session failed");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// Runs one gateway session. Returns `Ok` when Discord closes the socket or
/// requests a reconnect, and `Err` on transport failures or when a heartbeat
/// goes unacknowledged until the next one is due.
pub(crate) async fn run_session(inner: &Arc<DiscordInner>) -> UnibotResult<()> {
    let url = &inner.config.gateway_url;
    info!(url = %url, "Discord gateway: connecting");

    let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| UnibotError::Channel(format!("Discord gateway connect error: {e}")))?;
    let (mut write, mut read) = ws_stream.split();

    // HELLO carries the heartbeat interval
    let hello = loop {
        match read.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                let frame: GatewayFrame = serde_json::from_str(&text)?;
                if frame.op == OP_HELLO {
                    break frame;
                }
                debug!(op = frame.op, "Discord gateway: frame before HELLO ignored");
            }
            Some(Ok(WsMessage::Close(_))) | None => {
                return Err(UnibotError::Channel(
                    "Discord gateway closed before HELLO".to_string(),
                ))
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return Err(UnibotError::Channel(format!("Discord gateway read error: {e}")))
            }
        }
    };
    let interval_ms = hello.d["heartbeat_interval"].as_u64().unwrap_or(41_250);

    write
        .send(identify(&inner.config.token, inner.config.intents).to_ws()?)
        .await
        .map_err(|e| UnibotError::Channel(format!("Discord IDENTIFY send error: {e}")))?;
    debug!(interval_ms, "Discord gateway: identified");

    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    // A stalled task must not fire a burst of ticks ahead of the ack
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;
    let mut seq: Option<u64> = None;
    let mut awaiting_ack = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if awaiting_ack {
                    return Err(UnibotError::Channel(
                        "Discord gateway did not acknowledge the last heartbeat".to_string(),
                    ));
                }
                write
                    .send(heartbeat(seq).to_ws()?)
                    .await
                    .map_err(|e| UnibotError::Channel(format!("Discord heartbeat send error: {e}")))?;
                awaiting_ack = true;
            }
            msg = read.next() => {
                let text = match msg {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Close(frame))) => {
                        info!(frame = ?frame, "Discord gateway: server closed connection");
                        return Ok(());
                    }
                    None => return Ok(()),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        return Err(UnibotError::Channel(format!("Discord gateway read error: {e}")))
                    }
                };

                let frame: GatewayFrame = match serde_json::from_str(&text) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "Discord gateway: unparseable frame");
                        continue;
                    }
                };
                if frame.s.is_some() {
                    seq = frame.s;
                }

                match frame.op {
                    OP_DISPATCH => {
                        let name = frame.t.unwrap_or_default();
                        let inner = inner.clone();
                        // Handlers may be slow; keep heartbeats flowing
                        tokio::spawn(async move {
                            if let Err(e) = inner.handle_dispatch(&name, frame.d).await {
                                warn!(dispatch = %name, error = %e, "Discord dispatch failed");
                            }
                        });
                    }
                    OP_HEARTBEAT => {
                        write
                            .send(heartbeat(seq).to_ws()?)
                            .await
                            .map_err(|e| UnibotError::Channel(format!("Discord heartbeat send error: {e}")))?;
                    }
                    OP_RECONNECT | OP_INVALID_SESSION => {
                        info!(op = frame.op, "Discord gateway: reconnect requested");
                        return Ok(());
                    }
                    OP_HEARTBEAT_ACK => awaiting_ack = false,
                    other => debug!(op = other, "Discord gateway: unhandled opcode"),
                }
            }
        }
    }
}
