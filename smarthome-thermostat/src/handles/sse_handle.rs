use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use tokio_stream::{Stream, StreamExt};

use crate::services::ObserverRegistry;

#[derive(Clone)]
pub struct SSEState {
    pub observers: Arc<ObserverRegistry>,
}

pub async fn sse_handler(
    State(state): State<SSEState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.observers.subscribe();

    let stream = subscription.filter_map(|snapshot| {
        match Event::default().json_data(&snapshot) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("failed to encode snapshot: {e}");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
