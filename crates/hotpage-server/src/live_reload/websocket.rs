//! WebSocket endpoint that registers the live reload connection.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};

use super::channel::{NotificationChannel, pump};
use crate::state::AppState;

/// Handle the WebSocket upgrade for live reload.
///
/// A failed handshake is logged and answered with the rejection; nothing is
/// registered in that case.
pub(crate) async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected live reload upgrade");
            return rejection.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Register an established connection and forward frames to it.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let Some(registry) = state.live_reload.as_ref().map(|lr| lr.registry().clone()) else {
        return;
    };
    drop(state);

    let (channel, frames) = NotificationChannel::new();
    registry.set_connection(channel).await;
    pump(socket, frames).await;
}
