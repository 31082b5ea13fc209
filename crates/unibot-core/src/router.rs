use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{Adapter, Context, EventType, IncomingEvent, UnibotResult};

/// A user handler for one event type.
pub type EventHandler = Arc<dyn Fn(Context) -> BoxFuture<'static, UnibotResult<()>> + Send + Sync>;

/// Maps event types to handlers and fans events out to them.
///
/// Handlers of one event run concurrently and are started in registration
/// order. A failing handler never cancels its siblings: every handler runs
/// to completion, and `handle` then reports the first failure in
/// registration order.
#[derive(Default)]
pub struct Router {
    handlers: RwLock<HashMap<EventType, Vec<EventHandler>>>,
}

impl Router {
    /// Empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` for `event_type`. Registering the same handler twice
    /// makes it run twice.
    pub fn on<F, Fut>(&self, event_type: EventType, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = UnibotResult<()>> + Send + 'static,
    {
        let handler: EventHandler = Arc::new(move |ctx| handler(ctx).boxed());
        self.handlers
            .write()
            .entry(event_type)
            .or_default()
            .push(handler);
        debug!(event_type = %event_type, "Registered handler");
    }

    /// Number of handlers registered for `event_type`.
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers
            .read()
            .get(&event_type)
            .map_or(0, Vec::len)
    }

    /// Dispatches `event` to every handler registered for its type.
    pub async fn handle(&self, event: IncomingEvent, adapter: Arc<dyn Adapter>) -> UnibotResult<()> {
        let handlers = self
            .handlers
            .read()
            .get(&event.event_type)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            debug!(
                channel = %event.channel,
                event_type = %event.event_type,
                "No handlers registered, dropping event"
            );
            return Ok(());
        }

        let channel = event.channel;
        let event_type = event.event_type;
        let ctx = Context::new(event, adapter);

        debug!(
            channel = %channel,
            event_type = %event_type,
            handlers = handlers.len(),
            "Dispatching event"
        );

        let results = join_all(handlers.iter().map(|handler| handler(ctx.clone()))).await;

        let mut first_error = None;
        for (index, result) in results.into_iter().enumerate() {
            if let Err(e) = result {
                warn!(
                    channel = %channel,
                    event_type = %event_type,
                    handler = index,
                    error = %e,
                    "Event handler failed"
                );
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<EventType, usize> = self
            .handlers
            .read()
            .iter()
            .map(|(k, v)| (*k, v.len()))
            .collect();
        f.debug_struct("Router").field("handlers", &counts).finish()
    }
}
