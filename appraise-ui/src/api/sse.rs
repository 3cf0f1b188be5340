//! Server-Sent Events (SSE) for prediction state streaming

use crate::AppState;
use appraise_common::models::StateSnapshot;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

fn state_event(snapshot: &StateSnapshot) -> Option<Event> {
    match Event::default().event("state").json_data(snapshot) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("SSE: Failed to serialize state snapshot: {}", e);
            None
        }
    }
}

/// GET /events - SSE stream of controller state
///
/// Sends the current snapshot on connect, then one `state` event per
/// published transition. Intermediate states may be coalesced when a client
/// falls behind; the latest state is always delivered.
pub async fn state_event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to state events");

    let mut rx = state.controller.subscribe();

    let stream = async_stream::stream! {
        let current = rx.borrow_and_update().clone();
        if let Some(event) = state_event(&current) {
            yield Ok(event);
        }

        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            debug!(
                generation = snapshot.generation,
                state = snapshot.state.name(),
                "SSE: Broadcasting state"
            );
            if let Some(event) = state_event(&snapshot) {
                yield Ok(event);
            }
        }

        info!("SSE: State stream closed");
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
