use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellEventsConfig {
    pub buffer_capacity: usize,
}

impl Default for ShellEventsConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_EVENT_BUFFER_CAPACITY,
        }
    }
}

/// Fan-out hub for backend notifications. One broadcast channel per event
/// name, created lazily on first listen or emit.
#[derive(Debug)]
pub struct ShellEvents {
    config: ShellEventsConfig,
    senders: RwLock<HashMap<String, broadcast::Sender<Value>>>,
}

impl Default for ShellEvents {
    fn default() -> Self {
        Self::new(ShellEventsConfig::default())
    }
}

impl ShellEvents {
    pub fn new(config: ShellEventsConfig) -> Self {
        assert!(
            config.buffer_capacity > 0,
            "buffer_capacity must be greater than 0"
        );
        Self {
            config,
            senders: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to one event name. Dropping the returned subscription is
    /// the unlisten operation.
    pub fn listen(&self, event: &str) -> EventSubscription {
        EventSubscription {
            event: event.to_owned(),
            receiver: self.sender_for(event).subscribe(),
        }
    }

    /// Publish a payload to current subscribers. Events carry no replay
    /// guarantee; a payload emitted with no listener is dropped.
    pub fn emit(&self, event: &str, payload: Value) {
        let sender = self.sender_for(event);
        if sender.receiver_count() == 0 {
            trace!(event, "dropping shell event with no subscribers");
            return;
        }
        let _ = sender.send(payload);
    }

    fn sender_for(&self, event: &str) -> broadcast::Sender<Value> {
        if let Some(sender) = self
            .senders
            .read()
            .expect("shell events sender lock poisoned")
            .get(event)
        {
            return sender.clone();
        }

        let mut senders = self
            .senders
            .write()
            .expect("shell events sender lock poisoned");
        senders
            .entry(event.to_owned())
            .or_insert_with(|| broadcast::channel(self.config.buffer_capacity).0)
            .clone()
    }
}

#[derive(Debug)]
pub struct EventSubscription {
    event: String,
    receiver: broadcast::Receiver<Value>,
}

impl EventSubscription {
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Next payload for this event. `None` once the hub is gone or this
    /// subscriber lagged past the buffer and the channel closed.
    pub async fn recv(&mut self) -> Option<Value> {
        loop {
            match self.receiver.recv().await {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    trace!(event = %self.event, missed, "event subscriber lagged; continuing");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
