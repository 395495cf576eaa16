//! SSE endpoint for pipeline events

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /events
///
/// Streams ScanPlantEvents (state changes, alerts, save results) to the
/// observing presentation layer.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    scanplant_common::sse::create_event_sse_stream("scanplant-id", &state.event_bus)
}
