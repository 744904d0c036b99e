//! Server-Sent Events (SSE) stream of channel events.
//!
//! Opening the stream subscribes to the [`BroadcastEndpoint`], which is the
//! connection notification that makes a deferred channel drain its queue.
//!
//! [`BroadcastEndpoint`]: crate::channel::BroadcastEndpoint

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::channel::QueuedEvent;

use super::state::SharedState;

/// Convert a channel event into an SSE frame named after the event.
///
/// The data is the JSON array of the event's arguments.
fn to_sse(event: &QueuedEvent) -> Event {
    let data = serde_json::to_string(&event.payload).unwrap_or_default();
    Event::default().event(&event.name).data(data)
}

/// GET /api/v1/lumi/events - SSE stream of channel events.
pub async fn events_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    let stream = UnboundedReceiverStream::new(rx).map(|event| Ok(to_sse(&event)));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

