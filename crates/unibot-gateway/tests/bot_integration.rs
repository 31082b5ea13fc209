#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end: webhook request → adapter → router → handler → reply.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;
use unibot_channels::TelegramConfig;
use unibot_core::{
    Adapter, Channel, CoreEventHandler, Destination, EventType, HandlerSlot, IncomingEvent,
    Message, UnibotError, UnibotResult,
};
use unibot_gateway::{webhook_router, Bot, BotConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn telegram_update(text: &str) -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "from": {"id": 123, "is_bot": false},
            "chat": {"id": 456},
            "text": text
        }
    })
}

fn webhook_request(body: &Value, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook/telegram")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header("X-Telegram-Bot-Api-Secret-Token", secret);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn telegram_bot(server: &MockServer, secret: Option<&str>) -> Bot {
    let mut config = TelegramConfig::new("123:abc");
    config.api_base = server.uri();
    config.secret_token = secret.map(str::to_string);
    Bot::new(BotConfig {
        telegram: Some(config),
        discord: None,
    })
}

// ---------------------------------------------------------------------------
// Telegram webhook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_webhook_echo_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let bot = telegram_bot(&server, Some("s3cret"));
    bot.on(EventType::Message, |ctx| async move {
        let greeting = format!("Hello from {}!", ctx.channel().display_name());
        ctx.reply(Message::text(greeting)).await
    });

    let response = webhook_router(&bot)
        .oneshot(webhook_request(&telegram_update("hi"), Some("s3cret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({"ok": true}));

    let requests = server.received_requests().await.unwrap();
    let sent: Value = requests[0].body_json().unwrap();
    assert_eq!(sent["chat_id"], "456");
    assert_eq!(sent["text"], "Hello from Telegram!");
}

#[tokio::test]
async fn test_webhook_rejects_bad_secret() {
    let server = MockServer::start().await;
    let bot = telegram_bot(&server, Some("s3cret"));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    bot.on(EventType::Message, move |_ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    });

    for secret in [None, Some("wrong")] {
        let response = webhook_router(&bot)
            .oneshot(webhook_request(&telegram_update("hi"), secret))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_handler_failure_is_acknowledged_without_redelivery() {
    let server = MockServer::start().await;
    let bot = telegram_bot(&server, None);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    bot.on(EventType::Message, move |_ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    });
    bot.on(EventType::Message, |_ctx| async {
        Err(UnibotError::Handler("boom".into()))
    });

    let response = webhook_router(&bot)
        .oneshot(webhook_request(&telegram_update("hi"), None))
        .await
        .unwrap();
    // Any non-2xx makes Telegram resend the update to every handler again
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let body = response_json(response).await;
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn test_bot_updates_are_accepted_and_ignored() {
    let server = MockServer::start().await;
    let bot = telegram_bot(&server, None);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    bot.on(EventType::Message, move |_ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    });

    let mut update = telegram_update("from a bot");
    update["message"]["from"]["is_bot"] = json!(true);
    let response = webhook_router(&bot)
        .oneshot(webhook_request(&update, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_button_click_reaches_handler() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/answerCallbackQuery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let bot = telegram_bot(&server, None);
    let clicked = Arc::new(Mutex::new(None));
    let sink = clicked.clone();
    bot.on(EventType::ButtonClick, move |ctx| {
        *sink.lock() = ctx.text().map(str::to_string);
        async { Ok(()) }
    });

    let update = json!({
        "callback_query": {
            "id": "cb1",
            "from": {"id": 123},
            "message": {"message_id": 5, "chat": {"id": 456}},
            "data": "btn_yes"
        }
    });
    let response = webhook_router(&bot)
        .oneshot(webhook_request(&update, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(clicked.lock().as_deref(), Some("btn_yes"));
}

// ---------------------------------------------------------------------------
// Custom adapters
// ---------------------------------------------------------------------------

struct FakeAdapter {
    channel: Channel,
    handler: HandlerSlot,
    sent: Mutex<Vec<(Message, Destination)>>,
}

impl FakeAdapter {
    fn new(channel: Channel) -> Arc<Self> {
        Arc::new(Self {
            channel,
            handler: HandlerSlot::new(),
            sent: Mutex::new(Vec::new()),
        })
    }

    async fn inject(&self, event: IncomingEvent) -> UnibotResult<()> {
        let handler = self.handler.get().unwrap();
        handler(event).await
    }
}

#[async_trait]
impl Adapter for FakeAdapter {
    fn name(&self) -> Channel {
        self.channel
    }

    fn attach_core(&self, handler: CoreEventHandler) {
        self.handler.set(handler);
    }

    async fn send(&self, message: &Message, destination: &Destination) -> UnibotResult<()> {
        self.sent.lock().push((message.clone(), destination.clone()));
        Ok(())
    }
}

#[tokio::test]
async fn test_custom_adapter_reply_goes_back_to_it() {
    let discord = FakeAdapter::new(Channel::Discord);
    let bot = Bot::with_adapters([discord.clone() as Arc<dyn Adapter>]);
    bot.on(EventType::Reaction, |ctx| async move {
        let reaction = ctx.reaction().unwrap_or_default().to_string();
        ctx.reply(Message::text(format!("You reacted with {reaction}"))).await
    });

    let event = IncomingEvent::new(Channel::Discord, EventType::Reaction, "u1", json!({}))
        .with_chat_id("c1")
        .with_reaction("👍");
    discord.inject(event).await.unwrap();

    let sent = discord.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, Message::text("You reacted with 👍"));
    assert_eq!(sent[0].1.target_id(), "c1");
    assert_eq!(sent[0].1.channel, Channel::Discord);
}

#[tokio::test]
async fn test_both_handlers_run_once() {
    let adapter = FakeAdapter::new(Channel::Telegram);
    let bot = Bot::with_adapters([adapter.clone() as Arc<dyn Adapter>]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second"] {
        let calls = calls.clone();
        bot.on(EventType::Join, move |_ctx| {
            calls.lock().push(name);
            async { Ok(()) }
        });
    }

    adapter
        .inject(IncomingEvent::new(Channel::Telegram, EventType::Join, "u", json!({})))
        .await
        .unwrap();
    assert_eq!(*calls.lock(), vec!["first", "second"]);
}

#[test]
fn test_core_handler_does_not_keep_adapter_alive() {
    let adapter = FakeAdapter::new(Channel::Telegram);
    let bot = Bot::with_adapters([adapter.clone() as Arc<dyn Adapter>]);
    // Ours plus the bot's map entry
    assert_eq!(Arc::strong_count(&adapter), 2);
    drop(bot);
    assert_eq!(Arc::strong_count(&adapter), 1);
}

#[tokio::test]
async fn test_dropped_adapter_reports_error() {
    let adapter = FakeAdapter::new(Channel::Telegram);
    let bot = Bot::with_adapters([adapter.clone() as Arc<dyn Adapter>]);
    let handler = adapter.handler.get().unwrap();
    drop(bot);
    drop(adapter);

    let err = handler(IncomingEvent::new(Channel::Telegram, EventType::Message, "u", json!({})))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("adapter was dropped"));
}
