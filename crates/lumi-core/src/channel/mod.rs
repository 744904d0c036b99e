//! Deferred event delivery to the UI process.
//!
//! The backend starts emitting events (import progress, finished exports,
//! menu actions) before the UI has connected its event stream. A
//! [`DeferredEventChannel`] queues everything emitted while disconnected and
//! drains the queue, in emission order, the first time its endpoint reports a
//! connection. From then on events are forwarded immediately.
//!
//! ## States
//!
//! | State | `emit` |
//! |-------|--------|
//! | `Disconnected` | appends to the queue |
//! | `Connected` | forwards to the endpoint |
//!
//! `Connected` is terminal. Later connection notifications do not re-queue or
//! re-drain anything. Binding a new endpoint while connected keeps the channel
//! connected and forwards to the new endpoint.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lumi_core::channel::{BroadcastEndpoint, DeferredEventChannel};
//!
//! let channel = DeferredEventChannel::new();
//! channel.emit("import-progress", vec![json!(10)]);
//!
//! let endpoint = Arc::new(BroadcastEndpoint::default());
//! channel.bind(endpoint.clone());
//! let mut rx = endpoint.subscribe(); // connection: queued events flow
//! ```

mod endpoint;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;

pub use endpoint::BroadcastEndpoint;

/// A named event with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedEvent {
    /// Event identifier
    pub name: String,
    /// Ordered arguments
    pub payload: Vec<serde_json::Value>,
}

impl QueuedEvent {
    /// Create an event.
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Vec<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Connection state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection observed yet; events are queued
    #[default]
    Disconnected,
    /// Connected; events are forwarded immediately
    Connected,
}

/// Downstream receiver of channel events.
pub trait EventEndpoint: Send + Sync {
    /// Deliver one event. Must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be handed to the transport.
    fn send(&self, event: &QueuedEvent) -> Result<()>;

    /// Number of connections the endpoint has seen so far.
    ///
    /// Every increment is a connection notification.
    fn connections(&self) -> watch::Receiver<usize>;
}

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    queue: Vec<QueuedEvent>,
    endpoint: Option<Arc<dyn EventEndpoint>>,
    listener: Option<JoinHandle<()>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

/// Queues events until the endpoint connects, then forwards them.
///
/// Cloning yields another handle to the same channel.
#[derive(Clone, Default)]
pub struct DeferredEventChannel {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for DeferredEventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("DeferredEventChannel")
            .field("state", &inner.state)
            .field("queued", &inner.queue.len())
            .field("bound", &inner.endpoint.is_some())
            .finish()
    }
}

impl DeferredEventChannel {
    /// Create a disconnected channel with no endpoint.
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!("DeferredEventChannel: initialized");
        Self::default()
    }

    /// Create a channel already bound to `endpoint`.
    ///
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn with_endpoint(endpoint: Arc<dyn EventEndpoint>) -> Self {
        let channel = Self::new();
        channel.bind(endpoint);
        channel
    }

    /// Emit an event, forwarding it if connected and queueing it otherwise.
    ///
    /// Never waits for a connection.
    pub fn emit(&self, name: impl Into<String>, payload: Vec<serde_json::Value>) {
        let event = QueuedEvent::new(name, payload);
        let mut inner = self.lock();

        match (inner.state, inner.endpoint.clone()) {
            (ConnectionState::Connected, Some(endpoint)) => {
                tracing::debug!("DeferredEventChannel: immediately emitting '{}'", event.name);
                deliver(endpoint.as_ref(), &event);
            }
            _ => {
                tracing::debug!("DeferredEventChannel: queueing '{}'", event.name);
                inner.queue.push(event);
            }
        }
    }

    /// Emit an event whose single argument is `value` serialized to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn emit_json<T: Serialize>(&self, name: impl Into<String>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.emit(name, vec![value]);
        Ok(())
    }

    /// Bind the channel to `endpoint` and listen for its connections.
    ///
    /// Queued events stay queued until the endpoint reports a connection. An
    /// endpoint that already has a connection counts as notifying at bind
    /// time. Must be called within a Tokio runtime.
    pub fn bind(&self, endpoint: Arc<dyn EventEndpoint>) {
        tracing::debug!("DeferredEventChannel: endpoint bound");
        let mut connections = endpoint.connections();
        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);

        self.lock().endpoint = Some(endpoint);

        let listener = tokio::spawn(async move {
            let mut seen = *connections.borrow_and_update();
            if seen > 0 && !notify(&weak) {
                return;
            }
            while connections.changed().await.is_ok() {
                let count = *connections.borrow_and_update();
                if count > seen {
                    seen = count;
                    if !notify(&weak) {
                        return;
                    }
                }
            }
        });

        if let Some(previous) = self.lock().listener.replace(listener) {
            previous.abort();
        }
    }

    /// Record a connection of the bound endpoint.
    ///
    /// The first call drains the queue; later calls do nothing. Endpoint
    /// listeners installed by [`bind`](Self::bind) call this automatically.
    pub fn notify_connected(&self) {
        on_connection(&mut self.lock());
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Whether the channel has connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Number of events waiting for a connection.
    pub fn queued_len(&self) -> usize {
        self.lock().queue.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns `false` once the channel is gone.
fn notify(weak: &Weak<Mutex<Inner>>) -> bool {
    let Some(inner) = weak.upgrade() else {
        return false;
    };
    on_connection(&mut inner.lock().unwrap_or_else(PoisonError::into_inner));
    true
}

fn on_connection(inner: &mut Inner) {
    tracing::debug!("DeferredEventChannel: endpoint connected");

    if inner.state == ConnectionState::Connected {
        return;
    }
    let Some(endpoint) = inner.endpoint.clone() else {
        tracing::warn!("DeferredEventChannel: connection reported without an endpoint");
        return;
    };

    inner.state = ConnectionState::Connected;

    tracing::debug!(
        "DeferredEventChannel: emitting {} queued events",
        inner.queue.len()
    );
    for event in inner.queue.drain(..) {
        deliver(endpoint.as_ref(), &event);
    }
}

fn deliver(endpoint: &dyn EventEndpoint, event: &QueuedEvent) {
    if let Err(e) = endpoint.send(event) {
        tracing::debug!(
            "DeferredEventChannel: failed to deliver '{}': {}",
            event.name,
            e
        );
    }
}
