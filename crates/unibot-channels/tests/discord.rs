#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Discord adapter against a mocked REST API and a local fake gateway.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{FutureExt, SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use unibot_channels::{DiscordAdapter, DiscordConfig};
use unibot_core::{Adapter, Button, ButtonStyle, Channel, Destination, EventType, IncomingEvent, Message};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(server: &MockServer) -> DiscordAdapter {
    let mut config = DiscordConfig::new("discord-token");
    config.api_base = server.uri();
    DiscordAdapter::new(config)
}

fn recorder(adapter: &DiscordAdapter) -> Arc<Mutex<Vec<IncomingEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    adapter.attach_core(Arc::new(move |event| {
        sink.lock().push(event);
        async { Ok(()) }.boxed()
    }));
    seen
}

// ---------------------------------------------------------------------------
// send
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_send_posts_to_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/room-88/messages"))
        .and(header("authorization", "Bot discord-token"))
        .and(body_json(json!({
            "content": "Pick",
            "components": [{"type": 1, "components": [
                {"type": 2, "style": 3, "label": "Yes", "custom_id": "yes"}
            ]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m1"})))
        .expect(1)
        .mount(&server)
        .await;

    let message = Message::text("Pick").button(Button::new("yes", "Yes").with_style(ButtonStyle::Success));
    adapter_for(&server)
        .send(
            &message,
            &Destination {
                channel: Channel::Discord,
                external_user_id: "u1".into(),
                external_chat_id: Some("room-88".into()),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_without_chat_opens_dm() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/@me/channels"))
        .and(body_json(json!({"recipient_id": "u1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "dm-5", "type": 1})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/channels/dm-5/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m2"})))
        .expect(1)
        .mount(&server)
        .await;

    adapter_for(&server)
        .send(
            &Message::text("psst"),
            &Destination {
                channel: Channel::Discord,
                external_user_id: "u1".into(),
                external_chat_id: None,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
        .mount(&server)
        .await;

    let err = adapter_for(&server)
        .send(
            &Message::text("hi"),
            &Destination {
                channel: Channel::Discord,
                external_user_id: "u1".into(),
                external_chat_id: Some("c".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("403"));
    assert!(err.to_string().contains("Missing Access"));
}

// ---------------------------------------------------------------------------
// interactions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_button_interaction_is_acknowledged_then_dispatched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/interactions/77/tok-1/callback"))
        .and(body_json(json!({"type": 6})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server);
    let seen = recorder(&adapter);

    adapter
        .handle_dispatch(
            "INTERACTION_CREATE",
            json!({
                "id": "77",
                "token": "tok-1",
                "type": 3,
                "channel_id": "c1",
                "member": {"user": {"id": "u1"}},
                "message": {"id": "m1"},
                "data": {"component_type": 2, "custom_id": "yes"}
            }),
        )
        .await
        .unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].event_type, EventType::ButtonClick);
    assert_eq!(seen[0].text.as_deref(), Some("yes"));
}

// ---------------------------------------------------------------------------
// gateway
// ---------------------------------------------------------------------------

async fn next_json<S>(read: &mut S) -> Value
where
    S: futures_util::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        if let WsMessage::Text(text) = read.next().await.unwrap().unwrap() {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_gateway_session_identifies_and_dispatches() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (identify_tx, identify_rx) = tokio::sync::oneshot::channel::<Value>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut write, mut read) = ws.split();

        let hello = json!({"op": 10, "d": {"heartbeat_interval": 45000}});
        write.send(WsMessage::Text(hello.to_string())).await.unwrap();

        let identify = next_json(&mut read).await;
        identify_tx.send(identify).unwrap();

        let ready = json!({"op": 0, "s": 1, "t": "READY", "d": {"user": {"id": "bot-1"}}});
        write.send(WsMessage::Text(ready.to_string())).await.unwrap();
        let created = json!({"op": 0, "s": 2, "t": "MESSAGE_CREATE", "d": {
            "id": "m1", "channel_id": "c1", "author": {"id": "u1"}, "content": "Hello"
        }});
        write.send(WsMessage::Text(created.to_string())).await.unwrap();
        let echoed = json!({"op": 0, "s": 3, "t": "MESSAGE_CREATE", "d": {
            "id": "m2", "channel_id": "c1", "author": {"id": "bot-1", "bot": true}, "content": "Hi"
        }});
        write.send(WsMessage::Text(echoed.to_string())).await.unwrap();

        // Hold the socket open until the client goes away
        while read.next().await.is_some() {}
    });

    let mut config = DiscordConfig::new("discord-token");
    config.gateway_url = format!("ws://{addr}");
    config.intents = 513;
    let adapter = DiscordAdapter::new(config);
    let seen = recorder(&adapter);

    adapter.start().await.unwrap();
    assert!(adapter.is_running());

    let identify = tokio::time::timeout(Duration::from_secs(5), identify_rx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(identify["op"], 2);
    assert_eq!(identify["d"]["token"], "discord-token");
    assert_eq!(identify["d"]["intents"], 513);

    tokio::time::timeout(Duration::from_secs(5), async {
        while seen.lock().is_empty() || adapter.bot_user_id().is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    adapter.stop();
    assert!(!adapter.is_running());

    assert_eq!(adapter.bot_user_id().as_deref(), Some("bot-1"));
    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].text.as_deref(), Some("Hello"));
}

/// Fake gateway that sends HELLO with a short heartbeat interval and answers
/// heartbeats only when `ack` is set. Each accepted connection bumps the
/// returned counter.
async fn heartbeat_gateway(ack: bool) -> (String, Arc<Mutex<usize>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(Mutex::new(0usize));
    let counter = connections.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            *counter.lock() += 1;
            tokio::spawn(async move {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let (mut write, mut read) = ws.split();
                let hello = json!({"op": 10, "d": {"heartbeat_interval": 100}});
                if write.send(WsMessage::Text(hello.to_string())).await.is_err() {
                    return;
                }
                while let Some(Ok(msg)) = read.next().await {
                    let WsMessage::Text(text) = msg else { continue };
                    let frame: Value = serde_json::from_str(&text).unwrap();
                    if ack && frame["op"] == 1 {
                        let reply = json!({"op": 11});
                        if write.send(WsMessage::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    (format!("ws://{addr}"), connections)
}

fn gateway_adapter(url: String) -> DiscordAdapter {
    let mut config = DiscordConfig::new("discord-token");
    config.gateway_url = url;
    DiscordAdapter::new(config)
}

#[tokio::test]
async fn test_unacknowledged_heartbeat_reconnects() {
    let (url, connections) = heartbeat_gateway(false).await;
    let adapter = gateway_adapter(url);
    adapter.start().await.unwrap();

    // Session fails on the second tick, then the supervisor waits 1s
    tokio::time::timeout(Duration::from_secs(5), async {
        while *connections.lock() < 2 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();
    adapter.stop();
}

#[tokio::test]
async fn test_acknowledged_heartbeats_keep_session() {
    let (url, connections) = heartbeat_gateway(true).await;
    let adapter = gateway_adapter(url);
    adapter.start().await.unwrap();

    // Well past several heartbeat intervals and the reconnect delay
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(*connections.lock(), 1);
    adapter.stop();
}
