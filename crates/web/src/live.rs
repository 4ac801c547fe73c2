//! Live updates: store transitions pushed to open pages.
//!
//! [`LiveUpdates`] is registered as a store observer and republishes every
//! transition on a broadcast channel. `GET /events` turns a subscription into
//! a server-sent event stream; the page re-renders when it receives one.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use user_directory_core::{StoreObserver, UserAction, UserState};

use crate::state::AppState;

/// Events buffered per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Summary of one store transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreEvent {
    pub action: &'static str,
    pub users: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreEvent {
    fn from_transition(action: &UserAction, state: &UserState) -> Self {
        Self {
            action: action.kind(),
            users: state.users.len(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }
}

/// Broadcast fan-out of store transitions.
#[derive(Debug, Clone)]
pub struct LiveUpdates {
    tx: broadcast::Sender<StoreEvent>,
}

impl Default for LiveUpdates {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveUpdates {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Receive every transition from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}

impl StoreObserver for LiveUpdates {
    fn on_transition(&self, action: &UserAction, state: &UserState) {
        // No open pages is not an error.
        let _ = self.tx.send(StoreEvent::from_transition(action, state));
    }
}

/// Server-sent event stream of store transitions.
///
/// GET /events
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.live().subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let json = serde_json::to_string(&event).unwrap_or_else(|_| {
                        r#"{"action":"unknown"}"#.to_string()
                    });
                    yield Ok::<_, Infallible>(Event::default().event("store").data(json));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "live update subscriber lagged");
                    yield Ok::<_, Infallible>(Event::default().event("store").data(r#"{"action":"lagged"}"#));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
