use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::Stream;
use tokio::sync::broadcast::error::RecvError;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(events))
}

async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.reload.subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                // A lagged receiver has missed at least one signal, which
                // still means state changed: tell it to reload.
                Ok(()) | Err(RecvError::Lagged(_)) => {
                    yield Ok(Event::default().event("reload").data(""))
                }
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}
