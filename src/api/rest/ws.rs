use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::models::event::ShipmentEvent;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WatchQuery {
    /// Only forward events for this tracking number.
    pub tracking_number: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WatchQuery>,
) -> impl IntoResponse {
    let watched = query
        .tracking_number
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty());

    ws.on_upgrade(move |socket| handle_socket(socket, state, watched))
}

fn wanted(event: &ShipmentEvent, watched: Option<&str>) -> bool {
    watched.is_none_or(|code| event.tracking_number == code)
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, watched: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.shipment_events_tx.subscribe();

    info!(watched = ?watched, "websocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging; events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if !wanted(&event, watched.as_deref()) {
                continue;
            }

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize shipment event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("websocket client disconnected");
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::wanted;
    use crate::models::event::{ShipmentEvent, ShipmentEventKind};

    fn event(code: &str) -> ShipmentEvent {
        ShipmentEvent {
            kind: ShipmentEventKind::StatusChanged,
            shipment_id: Uuid::new_v4(),
            tracking_number: code.to_string(),
            status: None,
            at: Utc::now(),
        }
    }

    #[test]
    fn unfiltered_subscribers_get_everything() {
        assert!(wanted(&event("ABC123"), None));
    }

    #[test]
    fn filtered_subscribers_get_exact_matches_only() {
        assert!(wanted(&event("ABC123"), Some("ABC123")));
        assert!(!wanted(&event("ABC123"), Some("abc123")));
    }
}
