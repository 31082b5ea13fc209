use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use unibot_channels::telegram::SECRET_TOKEN_HEADER;
use unibot_channels::TelegramAdapter;
use unibot_core::{Channel, UnibotResult};

use crate::Bot;

/// Builds the HTTP routes for `bot`: `GET /health`, plus the Telegram
/// webhook when Telegram is configured.
pub fn webhook_router(bot: &Bot) -> Router {
    let channels: Vec<&'static str> = bot.channels().into_iter().map(Channel::as_str).collect();
    let mut app = Router::new().route(
        "/health",
        get(move || {
            let channels = channels.clone();
            async move {
                Json(json!({"status": "ok", "service": "unibot", "channels": channels}))
            }
        }),
    );

    if let Ok(telegram) = bot.require_telegram() {
        let path = telegram.webhook_path().to_string();
        info!(path = %path, "Telegram webhook route mounted");
        app = app.merge(
            Router::new()
                .route(&path, post(telegram_webhook))
                .with_state(telegram),
        );
    }

    app
}

/// `POST {webhook_path}` for Telegram.
///
/// The secret header is checked before the body is parsed. Handler failures
/// still answer 200: Telegram redelivers anything else, which would rerun
/// the handlers that already succeeded.
async fn telegram_webhook(
    State(adapter): State<Arc<TelegramAdapter>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let secret = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if !adapter.verify_secret(secret) {
        warn!("Telegram webhook secret validation failed");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error": "invalid secret"})),
        );
    }

    let update: Value = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Telegram webhook body is not JSON");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "error": "invalid JSON body"})),
            );
        }
    };

    match adapter.handle_update(update).await {
        Ok(()) => (StatusCode::OK, Json(json!({"ok": true}))),
        Err(e) => {
            error!(error = %e, "Telegram update handling failed");
            (
                StatusCode::OK,
                Json(json!({"ok": false, "error": e.to_string()})),
            )
        }
    }
}

/// Serves [`webhook_router`] on `addr` until `shutdown` resolves.
pub async fn serve(
    bot: &Bot,
    addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> UnibotResult<()> {
    let app = webhook_router(bot);
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
