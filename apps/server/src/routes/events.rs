//! Change feed route (Server-Sent Events).
//!
//! ```text
//! repositories ──► ChangeFeed (broadcast) ──► GET /api/events
//!                                              data: {"entity":"product",
//!                                                     "op":"updated",
//!                                                     "id":"..."}
//! ```
//!
//! Each event names what changed; clients re-fetch the collection they
//! care about. A subscriber that falls behind the broadcast buffer skips
//! the missed events and keeps reading; the UI catches up on its next
//! fetch.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::routes::AppState;

/// Build the event router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/events", get(subscribe))
}

/// Streams change events to the client for as long as it stays connected.
async fn subscribe(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.db.changes().subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|item| match item {
        Ok(change) => match Event::default().json_data(&change) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                warn!("Failed to serialize change event: {}", err);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(skipped, "SSE subscriber lagged behind the change feed");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
